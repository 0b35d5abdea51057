//! Build values from a stream of events.

use crate::binder::Binder;
use crate::contract::{Contract, ContractRef};
use crate::error::WriterError;
use crate::record::Record;
use crate::value::{Value, ValueMap};

enum Frame {
    List(Vec<Value>),
    Map(ValueMap),
    Record(Record),
}

impl Frame {
    const fn kind(&self) -> &'static str {
        match self {
            Frame::List(_) => "list",
            Frame::Map(_) => "map",
            Frame::Record(_) => "record",
        }
    }

    const fn is_named(&self) -> bool {
        !matches!(self, Frame::List(_))
    }
}

struct Open {
    // Name the container is written under once closed.
    name: Option<String>,
    frame: Frame,
}

/// A push-style builder of [`Value`]s, mirroring the serializer's events.
///
/// Containers are opened and closed with the `write_start_*`/`write_end_*`
/// pairs. Inside a map or record, every value and container must be preceded
/// by [`write_name`](ValueWriter::write_name); inside a list, names are not
/// allowed. A value written with no open container becomes the result, which
/// is returned by [`finish`](ValueWriter::finish).
///
/// # Examples
///
/// ```
/// use slate_record::{Binder, Value};
/// use slate_record::writer::ValueWriter;
///
/// let binder = Binder::new();
/// let mut writer = ValueWriter::new(&binder);
/// writer
///     .write_start_map()?
///     .write_name("list")?
///     .write_start_list()?
///     .write_value(1)?
///     .write_value("two")?
///     .write_end_list()?
///     .write_end_map()?;
///
/// let value = writer.finish()?;
/// let list = value.as_map().and_then(|m| m.get("list")).cloned();
/// assert_eq!(list, Some(Value::List(vec![Value::from(1), Value::from("two")])));
/// # Ok::<(), slate_record::WriterError>(())
/// ```
pub struct ValueWriter<'a> {
    binder: &'a Binder,
    stack: Vec<Open>,
    name: Option<String>,
    result: Option<Value>,
    finished: bool,
}

impl<'a> ValueWriter<'a> {
    /// A writer creating records with `binder`.
    pub fn new(binder: &'a Binder) -> Self {
        Self {
            binder,
            stack: Vec::new(),
            name: None,
            result: None,
            finished: false,
        }
    }

    fn check_open(&self) -> Result<(), WriterError> {
        if self.finished || self.result.is_some() {
            return Err(WriterError::Finished);
        }
        Ok(())
    }

    // The pending name, required inside maps and records.
    fn take_name(&mut self) -> Result<Option<String>, WriterError> {
        match self.stack.last() {
            Some(open) if open.frame.is_named() => match self.name.take() {
                Some(name) => Ok(Some(name)),
                None => Err(WriterError::NameRequired),
            },
            _ => Ok(None),
        }
    }

    fn push(&mut self, name: Option<String>, value: Value) -> Result<(), WriterError> {
        let Some(open) = self.stack.last_mut() else {
            self.result = Some(value);
            return Ok(());
        };

        match (&mut open.frame, name) {
            (Frame::List(items), _) => items.push(value),
            (Frame::Map(map), Some(name)) => {
                map.insert(name, value);
            }
            (Frame::Record(record), Some(name)) => {
                record.set(name, value)?;
            }
            (_, None) => return Err(WriterError::NameRequired),
        }
        Ok(())
    }

    fn open(&mut self, frame: Frame) -> Result<&mut Self, WriterError> {
        self.check_open()?;
        let name = self.take_name()?;
        self.stack.push(Open { name, frame });
        Ok(self)
    }

    fn close(&mut self, expected: &'static str) -> Result<&mut Self, WriterError> {
        self.check_open()?;
        match self.stack.last() {
            Some(open) if open.frame.kind() == expected => {}
            _ => return Err(WriterError::Mismatched { expected }),
        }
        if self.name.is_some() {
            return Err(WriterError::NameAlreadySet);
        }

        let Some(Open { name, frame }) = self.stack.pop() else {
            return Err(WriterError::Mismatched { expected });
        };
        let value = match frame {
            Frame::List(items) => Value::List(items),
            Frame::Map(map) => Value::Map(map),
            Frame::Record(record) => Value::Record(record),
        };
        self.push(name, value)?;
        Ok(self)
    }

    /// Set the name of the next value in the enclosing map or record.
    pub fn write_name(&mut self, name: impl Into<String>) -> Result<&mut Self, WriterError> {
        self.check_open()?;
        if self.name.is_some() {
            return Err(WriterError::NameAlreadySet);
        }
        match self.stack.last() {
            Some(open) if open.frame.is_named() => {
                self.name = Some(name.into());
                Ok(self)
            }
            _ => Err(WriterError::NameOutsideContainer),
        }
    }

    /// Write a value into the enclosing container, or as the result.
    pub fn write_value(&mut self, value: impl Into<Value>) -> Result<&mut Self, WriterError> {
        self.check_open()?;
        let name = self.take_name()?;
        self.push(name, value.into())?;
        Ok(self)
    }

    pub fn write_start_list(&mut self) -> Result<&mut Self, WriterError> {
        self.open(Frame::List(Vec::new()))
    }

    pub fn write_end_list(&mut self) -> Result<&mut Self, WriterError> {
        self.close("list")
    }

    pub fn write_start_map(&mut self) -> Result<&mut Self, WriterError> {
        self.open(Frame::Map(ValueMap::default()))
    }

    pub fn write_end_map(&mut self) -> Result<&mut Self, WriterError> {
        self.close("map")
    }

    /// Open a record bound to `contract`.
    pub fn write_start_record(&mut self, contract: ContractRef) -> Result<&mut Self, WriterError> {
        self.check_open()?;
        let record = self.binder.create(contract)?;
        self.open(Frame::Record(record))
    }

    /// Open a record bound to the contract `C`.
    #[inline]
    pub fn write_start_typed<C: ?Sized + Contract>(&mut self) -> Result<&mut Self, WriterError> {
        self.write_start_record(C::info())
    }

    pub fn write_end_record(&mut self) -> Result<&mut Self, WriterError> {
        self.close("record")
    }

    /// Take the built value. Nothing can be written afterwards.
    pub fn finish(&mut self) -> Result<Value, WriterError> {
        if self.finished {
            return Err(WriterError::Finished);
        }
        if !self.stack.is_empty() {
            return Err(WriterError::Incomplete(self.stack.len()));
        }
        let value = self.result.take().ok_or(WriterError::Empty)?;
        self.finished = true;
        Ok(value)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::ValueWriter;
    use crate::binder::Binder;
    use crate::error::{RecordError, WriterError};
    use crate::value::Value;
    use crate::{Typed, contract};

    #[contract]
    pub trait TestSlug {
        fn get_foo(&self) -> Result<Option<String>, RecordError>;
        fn set_foo(&mut self, foo: Option<String>) -> Result<&mut Self, RecordError>;
    }

    #[test]
    fn scalar_result() {
        let binder = Binder::new();
        let mut writer = ValueWriter::new(&binder);
        writer.write_value(true).unwrap();
        assert_eq!(writer.finish().unwrap(), Value::Bool(true));
    }

    #[test]
    fn nested_containers() {
        let binder = Binder::new();
        let mut writer = ValueWriter::new(&binder);
        writer
            .write_start_list()
            .and_then(|w| w.write_value(1))
            .and_then(|w| w.write_start_map())
            .and_then(|w| w.write_name("a"))
            .and_then(|w| w.write_value("b"))
            .and_then(|w| w.write_end_map())
            .and_then(|w| w.write_end_list())
            .unwrap();

        let value = writer.finish().unwrap();
        let list = value.as_list().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].as_map().and_then(|m| m.get("a")), Some(&Value::from("b")));
    }

    #[test]
    fn typed_record() {
        let binder = Binder::new();
        let mut writer = ValueWriter::new(&binder);
        writer
            .write_start_typed::<dyn TestSlug>()
            .and_then(|w| w.write_name("Foo"))
            .and_then(|w| w.write_value("Hello World"))
            .and_then(|w| w.write_name("Extra"))
            .and_then(|w| w.write_value(Value::Null))
            .and_then(|w| w.write_end_record())
            .unwrap();

        let record = writer.finish().unwrap().as_record().cloned().unwrap();
        assert_eq!(record.len(), 1);
        let slug: Typed<dyn TestSlug> = record.into_typed().unwrap();
        assert_eq!(slug.get_foo().unwrap().as_deref(), Some("Hello World"));
    }

    #[test]
    fn state_errors() {
        let binder = Binder::new();

        let mut writer = ValueWriter::new(&binder);
        assert!(matches!(writer.write_name("a"), Err(WriterError::NameOutsideContainer)));

        writer.write_start_map().unwrap();
        assert!(matches!(writer.write_value(1), Err(WriterError::NameRequired)));
        assert!(matches!(writer.write_start_list(), Err(WriterError::NameRequired)));
        writer.write_name("a").unwrap();
        assert!(matches!(writer.write_name("b"), Err(WriterError::NameAlreadySet)));
        assert!(matches!(
            writer.write_end_list(),
            Err(WriterError::Mismatched { expected: "list" })
        ));
        writer.write_start_list().unwrap();
        assert!(matches!(writer.write_name("x"), Err(WriterError::NameOutsideContainer)));
        assert!(matches!(writer.finish(), Err(WriterError::Incomplete(2))));

        writer.write_end_list().unwrap();
        writer.write_end_map().unwrap();
        assert!(matches!(writer.write_value(1), Err(WriterError::Finished)));
        writer.finish().unwrap();
        assert!(matches!(writer.finish(), Err(WriterError::Finished)));
        assert!(matches!(writer.write_start_map(), Err(WriterError::Finished)));
    }

    #[test]
    fn empty() {
        let binder = Binder::new();
        let mut writer = ValueWriter::new(&binder);
        assert!(matches!(writer.finish(), Err(WriterError::Empty)));
    }
}
