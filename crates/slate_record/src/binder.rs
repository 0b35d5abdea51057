use alloc::sync::Arc;
use core::fmt;
use core::marker::PhantomData;
use std::sync::{LazyLock, OnceLock, PoisonError, RwLock};

use crate::binding::{Binding, Members};
use crate::contract::{Contract, ContractRef};
use crate::error::BindError;
use crate::fields::Fields;
use crate::hash::HashMap;
use crate::record::Record;
use crate::typed::Typed;
use crate::value::ValueMap;

type Slot = Arc<OnceLock<Result<Arc<Binding>, BindError>>>;

/// Binds contracts and creates records.
///
/// Every contract is validated and bound once per `Binder`; later calls return
/// the same [`Binding`]. Concurrent first use of a contract still builds a
/// single binding: the global lock is only held to find the contract's slot,
/// and the binding is built inside that slot's once-cell, so unrelated
/// contracts never wait on each other.
///
/// A failed bind is cached as well and is not retried.
///
/// [`Binder::shared`] returns the process-wide instance.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use slate_record::{Binder, RecordError, Typed, contract};
///
/// #[contract]
/// pub trait Point {
///     fn get_x(&self) -> Result<Option<i32>, RecordError>;
///     fn set_x(&mut self, x: Option<i32>) -> Result<&mut Self, RecordError>;
///     fn with_y(&mut self, y: Option<i32>) -> Result<&mut Self, RecordError>;
/// }
///
/// let binder = Binder::new();
/// let first = binder.bind(<dyn Point as slate_record::Contract>::info()).unwrap();
/// let again = binder.bind(<dyn Point as slate_record::Contract>::info()).unwrap();
/// assert!(Arc::ptr_eq(&first, &again));
///
/// let mut point: Typed<dyn Point> = binder.create_typed().unwrap();
/// point.set_x(Some(1)).unwrap().with_y(Some(2)).unwrap();
/// assert_eq!(point.get_x().unwrap(), Some(1));
/// assert_eq!(point.members().len(), 2);
/// ```
#[derive(Default)]
pub struct Binder {
    slots: RwLock<HashMap<ContractRef, Slot>>,
}

impl Binder {
    /// Create a binder with an empty cache.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide binder.
    pub fn shared() -> Arc<Binder> {
        static SHARED: LazyLock<Arc<Binder>> = LazyLock::new(|| Arc::new(Binder::new()));
        SHARED.clone()
    }

    fn slot(&self, contract: ContractRef) -> Slot {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = slots.get(contract) {
            return slot.clone();
        }
        drop(slots);

        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(contract)
            .or_default()
            .clone()
    }

    /// Validate and bind `contract`, or return the cached binding.
    pub fn bind(&self, contract: ContractRef) -> Result<Arc<Binding>, BindError> {
        self.slot(contract)
            .get_or_init(|| Binding::build(contract).map(Arc::new))
            .clone()
    }

    /// The member table of `contract`.
    pub fn members_of(&self, contract: ContractRef) -> Result<Members, BindError> {
        Ok(self.bind(contract)?.members().clone())
    }

    /// An empty record bound to `contract`.
    pub fn create(&self, contract: ContractRef) -> Result<Record, BindError> {
        self.wrap(contract, Fields::new())
    }

    /// A record bound to `contract` holding a copy of `entries`.
    pub fn create_from(&self, contract: ContractRef, entries: &ValueMap) -> Result<Record, BindError> {
        self.wrap(contract, Fields::from_map(entries.clone()))
    }

    /// A record bound to `contract` that aliases `fields`.
    ///
    /// Changes through the record are visible through `fields` and the other way around.
    pub fn wrap(&self, contract: ContractRef, fields: Fields) -> Result<Record, BindError> {
        Ok(Record::new(self.bind(contract)?, fields))
    }

    /// An independent, mutable copy of `record` bound to the same contract.
    pub fn copy(&self, record: &Record) -> Record {
        Record::new(record.binding().clone(), Fields::from_map(record.fields().snapshot()))
    }

    /// An independent, mutable copy of `record` bound to `contract`.
    ///
    /// Fields are not converted.
    pub fn copy_as(&self, contract: ContractRef, record: &Record) -> Result<Record, BindError> {
        self.wrap(contract, Fields::from_map(record.fields().snapshot()))
    }

    /// `record` re-bound to `contract`, sharing its entries.
    pub fn cast(&self, contract: ContractRef, record: &Record) -> Result<Record, BindError> {
        self.wrap(contract, record.as_map())
    }

    // -------------------------------------------------------------------------
    // Typed

    #[inline]
    pub fn create_typed<C: ?Sized + Contract>(&self) -> Result<Typed<C>, BindError> {
        self.create(C::info()).map(Typed::new_unchecked)
    }

    #[inline]
    pub fn create_typed_from<C: ?Sized + Contract>(&self, entries: &ValueMap) -> Result<Typed<C>, BindError> {
        self.create_from(C::info(), entries).map(Typed::new_unchecked)
    }

    #[inline]
    pub fn wrap_typed<C: ?Sized + Contract>(&self, fields: Fields) -> Result<Typed<C>, BindError> {
        self.wrap(C::info(), fields).map(Typed::new_unchecked)
    }

    #[inline]
    pub fn copy_typed<C: ?Sized + Contract>(&self, record: &Record) -> Result<Typed<C>, BindError> {
        self.copy_as(C::info(), record).map(Typed::new_unchecked)
    }

    #[inline]
    pub fn cast_typed<C: ?Sized + Contract>(&self, record: &Record) -> Result<Typed<C>, BindError> {
        self.cast(C::info(), record).map(Typed::new_unchecked)
    }

    /// A reusable factory of records of the contract `C`.
    ///
    /// The contract is bound once, here; the factory creates records without
    /// going through the binder's cache again.
    pub fn factory<C: ?Sized + Contract>(&self) -> Result<RecordFactory<C>, BindError> {
        Ok(RecordFactory {
            binding: self.bind(C::info())?,
            marker: PhantomData,
        })
    }
}

impl fmt::Debug for Binder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("Binder")
            .field("contracts", &slots.keys().map(|c| c.to_string()).collect::<Vec<_>>())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// RecordFactory

/// Creates records of one contract, see [`Binder::factory`].
pub struct RecordFactory<C: ?Sized> {
    binding: Arc<Binding>,
    marker: PhantomData<fn() -> Typed<C>>,
}

impl<C: ?Sized + Contract> RecordFactory<C> {
    #[inline]
    pub fn binding(&self) -> &Arc<Binding> {
        &self.binding
    }

    /// An empty record.
    #[inline]
    pub fn create(&self) -> Typed<C> {
        self.wrap(Fields::new())
    }

    /// A record holding a copy of `entries`.
    #[inline]
    pub fn create_from(&self, entries: &ValueMap) -> Typed<C> {
        self.wrap(Fields::from_map(entries.clone()))
    }

    /// A record aliasing `fields`.
    #[inline]
    pub fn wrap(&self, fields: Fields) -> Typed<C> {
        Typed::new_unchecked(Record::new(self.binding.clone(), fields))
    }
}

impl<C: ?Sized> Clone for RecordFactory<C> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            binding: self.binding.clone(),
            marker: PhantomData,
        }
    }
}

impl<C: ?Sized> fmt::Debug for RecordFactory<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RecordFactory").field(&self.binding.contract().name()).finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use core::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;

    use super::Binder;
    use crate::contract::{AccessorInfo, ContractInfo, Receiver, Returns, Visibility};
    use crate::error::{BindError, RecordError};
    use crate::member::DeclaredType;
    use crate::value::{Value, ValueMap};
    use crate::{Contract, Typed, contract};

    #[contract]
    pub trait TestSlug {
        fn get_foo(&self) -> Result<Option<String>, RecordError>;
        fn set_foo(&mut self, foo: Option<String>) -> Result<&mut Self, RecordError>;
        fn get_bar(&self) -> Result<Option<i32>, RecordError>;
        fn set_bar(&mut self, bar: Option<i32>) -> Result<(), RecordError>;
    }

    #[contract]
    pub trait OtherSlug {
        fn get_foo(&self) -> Result<Option<String>, RecordError>;
        fn with_foo(&mut self, foo: Option<String>) -> Result<&mut Self, RecordError>;
    }

    #[contract]
    trait HiddenSlug {
        fn get_foo(&self) -> Result<Option<String>, RecordError>;
    }

    #[contract]
    pub trait VoidSlug {
        fn get_foo(&self);
    }

    fn info<C: ?Sized + Contract>() -> &'static ContractInfo {
        C::info()
    }

    #[test]
    fn read_and_write() {
        let binder = Binder::new();
        let mut slug: Typed<dyn TestSlug> = binder.create_typed().unwrap();

        assert_eq!(slug.get_foo().unwrap(), None);
        slug.set_foo(Some("Hello World".into())).unwrap();
        assert_eq!(slug.get_foo().unwrap().as_deref(), Some("Hello World"));
        assert_eq!(slug.get("Foo"), Some(Value::from("Hello World")));
        assert_eq!(slug.entries().len(), 1);

        slug.set_foo(None).unwrap();
        assert_eq!(slug.entries().len(), 0);
        assert_eq!(slug.get_foo().unwrap(), None);

        slug.set_bar(Some(7)).unwrap();
        assert_eq!(slug.get_bar().unwrap(), Some(7));
    }

    #[test]
    fn type_mismatch() {
        let binder = Binder::new();
        let mut slug: Typed<dyn TestSlug> = binder.create_typed().unwrap();
        slug.set("Bar", "not a number").unwrap();

        let err = slug.get_bar().unwrap_err();
        assert!(matches!(err, RecordError::TypeMismatch { found: "string", .. }));
    }

    #[test]
    fn frozen_writers_fail() {
        let binder = Binder::new();
        let mut slug: Typed<dyn TestSlug> = binder.create_typed().unwrap();
        slug.set_foo(Some("a".into())).unwrap();
        slug.freeze();

        assert!(matches!(slug.set_foo(None), Err(RecordError::Frozen(_))));
        assert!(matches!(slug.as_map().insert("Foo", Value::Null), Err(RecordError::Frozen(_))));
        assert_eq!(slug.get_foo().unwrap().as_deref(), Some("a"));
    }

    #[test]
    fn bind_is_cached() {
        let binder = Binder::new();
        let a = binder.bind(info::<dyn TestSlug>()).unwrap();
        let b = binder.bind(info::<dyn TestSlug>()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        let members = binder.members_of(info::<dyn TestSlug>()).unwrap();
        assert_eq!(members.get("Foo"), Some(&DeclaredType::String));
        assert_eq!(members.get("Bar"), Some(&DeclaredType::I32));
    }

    #[test]
    fn malformed_contracts() {
        let binder = Binder::new();
        assert!(matches!(
            binder.bind(info::<dyn HiddenSlug>()),
            Err(BindError::NotPublic(_))
        ));
        let first = binder.bind(info::<dyn VoidSlug>()).unwrap_err();
        let again = binder.bind(info::<dyn VoidSlug>()).unwrap_err();
        assert!(matches!(first, BindError::VoidReader { accessor: "get_foo", .. }));
        assert_eq!(first, again);
    }

    #[test]
    fn create_from_copies() {
        let binder = Binder::new();
        let mut entries = ValueMap::default();
        entries.insert("Foo".into(), Value::from("a"));

        let mut slug: Typed<dyn TestSlug> = binder.create_typed_from(&entries).unwrap();
        slug.set_foo(Some("b".into())).unwrap();
        assert_eq!(entries.get("Foo"), Some(&Value::from("a")));
    }

    #[test]
    fn wrap_aliases() {
        let binder = Binder::new();
        let fields = crate::Fields::new();
        let mut slug: Typed<dyn TestSlug> = binder.wrap_typed(fields.clone()).unwrap();

        slug.set_foo(Some("a".into())).unwrap();
        assert_eq!(fields.get("Foo"), Some(Value::from("a")));

        fields.insert("Foo", Value::from("b")).unwrap();
        assert_eq!(slug.get_foo().unwrap().as_deref(), Some("b"));
    }

    #[test]
    fn copy_and_cast() {
        let binder = Binder::new();
        let mut slug: Typed<dyn TestSlug> = binder.create_typed().unwrap();
        slug.set_foo(Some("a".into())).unwrap();

        let mut copy: Typed<dyn OtherSlug> = binder.copy_typed(&slug).unwrap();
        copy.with_foo(Some("b".into())).unwrap();
        assert_eq!(slug.get_foo().unwrap().as_deref(), Some("a"));
        assert_eq!(copy.contract(), info::<dyn OtherSlug>());

        let mut cast: Typed<dyn OtherSlug> = binder.cast_typed(&slug).unwrap();
        cast.with_foo(Some("c".into())).unwrap();
        assert_eq!(slug.get_foo().unwrap().as_deref(), Some("c"));

        let same = binder.copy(&slug);
        assert_eq!(same.contract(), info::<dyn TestSlug>());
        assert_eq!(same, *slug);
    }

    #[test]
    fn equality_ignores_contract() {
        let binder = Binder::new();
        let mut a: Typed<dyn TestSlug> = binder.create_typed().unwrap();
        let mut b: Typed<dyn OtherSlug> = binder.create_typed().unwrap();
        a.set_foo(Some("x".into())).unwrap();
        b.with_foo(Some("x".into())).unwrap();

        assert_eq!(*a, *b);
        assert_eq!(Value::from(a.clone()), Value::from(b.clone()));

        use core::hash::BuildHasher;
        let state = crate::hash::FixedHashState;
        assert_eq!(state.hash_one(&*a), state.hash_one(&*b));
    }

    #[test]
    fn into_typed_checks_contract() {
        let binder = Binder::new();
        let record = binder.create(info::<dyn TestSlug>()).unwrap();
        assert!(record.clone().into_typed::<dyn TestSlug>().is_ok());
        assert!(matches!(
            record.into_typed::<dyn OtherSlug>(),
            Err(RecordError::ContractMismatch { .. })
        ));
    }

    #[test]
    fn factory_shares_the_binding() {
        let binder = Binder::new();
        let factory = binder.factory::<dyn TestSlug>().unwrap();
        let clone = factory.clone();
        assert!(Arc::ptr_eq(factory.binding(), &binder.bind(info::<dyn TestSlug>()).unwrap()));

        let mut a = factory.create();
        a.set_foo(Some("a".into())).unwrap();
        let b = clone.create();
        assert_eq!(b.get_foo().unwrap(), None);
        assert_eq!(b.contract(), info::<dyn TestSlug>());

        let mut entries = ValueMap::default();
        entries.insert("Bar".into(), Value::I32(3));
        assert_eq!(factory.create_from(&entries).get_bar().unwrap(), Some(3));

        assert!(matches!(
            binder.factory::<dyn VoidSlug>(),
            Err(BindError::VoidReader { .. })
        ));
        assert!(format!("{binder:?}").contains("TestSlug"));
    }

    // Declared types are evaluated while the binding is built, so counting
    // calls counts builds.
    static BUILDS: AtomicUsize = AtomicUsize::new(0);

    fn counted() -> DeclaredType {
        BUILDS.fetch_add(1, Ordering::SeqCst);
        DeclaredType::String
    }

    const COUNTED_ACCESSORS: &[AccessorInfo] = &[AccessorInfo::new(
        "set_foo",
        None,
        Receiver::Mut,
        1,
        Some(counted),
        Returns::Unit,
    )];
    static COUNTED: ContractInfo =
        ContractInfo::new("Counted", "tests", Visibility::Public, COUNTED_ACCESSORS);

    #[test]
    fn concurrent_bind_builds_once() {
        const THREADS: usize = 16;

        let binder = Arc::new(Binder::new());
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let binder = binder.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    binder.bind(&COUNTED).unwrap()
                })
            })
            .collect();

        let bindings: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(bindings.iter().all(|b| Arc::ptr_eq(b, &bindings[0])));
        assert_eq!(BUILDS.load(Ordering::SeqCst), 1);
    }
}
