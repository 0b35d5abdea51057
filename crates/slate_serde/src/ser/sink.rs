use crate::error::SerializeError;

/// Receiver of serialization events.
///
/// Serializers push events into a sink, which writes them in its format.
/// Container events come in pairs, and inside an object every value is
/// preceded by [`write_field_name`](TokenSink::write_field_name).
///
/// The trait is object safe, so a [`Serializer`](super::Serializer) works
/// with any format.
pub trait TokenSink {
    fn write_null(&mut self) -> Result<(), SerializeError>;

    fn write_bool(&mut self, value: bool) -> Result<(), SerializeError>;

    fn write_str(&mut self, value: &str) -> Result<(), SerializeError>;

    /// Any integer that fits in 64 bits.
    fn write_i64(&mut self, value: i64) -> Result<(), SerializeError>;

    fn write_i128(&mut self, value: i128) -> Result<(), SerializeError>;

    fn write_f32(&mut self, value: f32) -> Result<(), SerializeError>;

    fn write_f64(&mut self, value: f64) -> Result<(), SerializeError>;

    fn write_binary(&mut self, value: &[u8]) -> Result<(), SerializeError>;

    fn write_start_array(&mut self, len: Option<usize>) -> Result<(), SerializeError>;

    fn write_end_array(&mut self) -> Result<(), SerializeError>;

    fn write_start_object(&mut self, len: Option<usize>) -> Result<(), SerializeError>;

    fn write_field_name(&mut self, name: &str) -> Result<(), SerializeError>;

    fn write_end_object(&mut self) -> Result<(), SerializeError>;
}
