//! 依赖环集成测试：单例环通过前向引用解析，含瞬时成员的环报错

use di_abstractions::{Deferrable, ForwardRef, Key};
use di_impl::ContainerBuilder;
use infrastructure_common::{DependencyError, DependencyResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn address_of<T: ?Sized>(value: &T) -> usize {
    value as *const T as *const () as usize
}

// 奇偶判断：两个单例互相依赖

trait Even: Send + Sync {
    fn is_even(&self, value: u32) -> DependencyResult<bool>;
}

trait Odd: Send + Sync {
    fn is_odd(&self, value: u32) -> DependencyResult<bool>;
}

struct EvenChecker {
    odd: Arc<dyn Odd>,
}

impl Even for EvenChecker {
    fn is_even(&self, value: u32) -> DependencyResult<bool> {
        if value == 0 {
            return Ok(true);
        }
        self.odd.is_odd(value - 1)
    }
}

struct OddChecker {
    even: Arc<dyn Even>,
}

impl Odd for OddChecker {
    fn is_odd(&self, value: u32) -> DependencyResult<bool> {
        if value == 0 {
            return Ok(false);
        }
        self.even.is_even(value - 1)
    }
}

impl Even for ForwardRef<dyn Even> {
    fn is_even(&self, value: u32) -> DependencyResult<bool> {
        self.target()?.is_even(value)
    }
}

impl Deferrable for dyn Even {
    fn defer(reference: ForwardRef<Self>) -> Arc<Self> {
        Arc::new(reference)
    }
}

impl Odd for ForwardRef<dyn Odd> {
    fn is_odd(&self, value: u32) -> DependencyResult<bool> {
        self.target()?.is_odd(value)
    }
}

impl Deferrable for dyn Odd {
    fn defer(reference: ForwardRef<Self>) -> Arc<Self> {
        Arc::new(reference)
    }
}

const EVEN: Key<dyn Even> = Key::new("IsEven");
const ODD: Key<dyn Odd> = Key::new("IsOdd");

fn parity_builder() -> ContainerBuilder {
    let mut builder = ContainerBuilder::new();
    builder
        .register_deferrable_singleton(EVEN, ODD, |odd| {
            let even: Arc<dyn Even> = Arc::new(EvenChecker { odd });
            Ok(even)
        })
        .unwrap()
        .register_deferrable_singleton(ODD, EVEN, |even| {
            let odd: Arc<dyn Odd> = Arc::new(OddChecker { even });
            Ok(odd)
        })
        .unwrap();
    builder
}

#[test]
fn test_two_member_cycle_resolves_from_either_side() {
    let container = parity_builder().build();
    let even = container.get(&EVEN).unwrap();
    let odd = container.get(&ODD).unwrap();

    assert!(even.is_even(10).unwrap());
    assert!(!even.is_even(7).unwrap());
    assert!(odd.is_odd(7).unwrap());
    assert_eq!(container.stats().pending_forward_references, 0);

    let container = parity_builder().build();
    let odd = container.get(&ODD).unwrap();
    assert!(odd.is_odd(3).unwrap());
    assert!(container.get(&EVEN).unwrap().is_even(4).unwrap());
}

#[test]
fn test_forward_target_dropped_with_container() {
    let container = parity_builder().build();
    let even = container.get(&EVEN).unwrap();
    let odd = container.get(&ODD).unwrap();
    assert!(odd.is_odd(1).unwrap());

    drop(even);
    drop(container);

    assert!(matches!(
        odd.is_odd(1),
        Err(DependencyError::ForwardTargetDropped { ref key_name }) if key_name == "IsEven"
    ));
    assert!(!odd.is_odd(0).unwrap());
}

// 三元环：A -> B -> C -> A

trait Alpha: Send + Sync {
    fn beta(&self) -> DependencyResult<Arc<dyn Beta>>;
    fn address(&self) -> DependencyResult<usize>;
}

trait Beta: Send + Sync {
    fn gamma(&self) -> DependencyResult<Arc<dyn Gamma>>;
    fn address(&self) -> DependencyResult<usize>;
}

trait Gamma: Send + Sync {
    fn alpha(&self) -> DependencyResult<Arc<dyn Alpha>>;
    fn address(&self) -> DependencyResult<usize>;
}

struct AlphaImpl {
    beta: Arc<dyn Beta>,
}

struct BetaImpl {
    gamma: Arc<dyn Gamma>,
}

struct GammaImpl {
    alpha: Arc<dyn Alpha>,
}

impl Alpha for AlphaImpl {
    fn beta(&self) -> DependencyResult<Arc<dyn Beta>> {
        Ok(Arc::clone(&self.beta))
    }

    fn address(&self) -> DependencyResult<usize> {
        Ok(address_of(self))
    }
}

impl Beta for BetaImpl {
    fn gamma(&self) -> DependencyResult<Arc<dyn Gamma>> {
        Ok(Arc::clone(&self.gamma))
    }

    fn address(&self) -> DependencyResult<usize> {
        Ok(address_of(self))
    }
}

impl Gamma for GammaImpl {
    fn alpha(&self) -> DependencyResult<Arc<dyn Alpha>> {
        Ok(Arc::clone(&self.alpha))
    }

    fn address(&self) -> DependencyResult<usize> {
        Ok(address_of(self))
    }
}

impl Alpha for ForwardRef<dyn Alpha> {
    fn beta(&self) -> DependencyResult<Arc<dyn Beta>> {
        self.target()?.beta()
    }

    fn address(&self) -> DependencyResult<usize> {
        self.target()?.address()
    }
}

impl Beta for ForwardRef<dyn Beta> {
    fn gamma(&self) -> DependencyResult<Arc<dyn Gamma>> {
        self.target()?.gamma()
    }

    fn address(&self) -> DependencyResult<usize> {
        self.target()?.address()
    }
}

impl Gamma for ForwardRef<dyn Gamma> {
    fn alpha(&self) -> DependencyResult<Arc<dyn Alpha>> {
        self.target()?.alpha()
    }

    fn address(&self) -> DependencyResult<usize> {
        self.target()?.address()
    }
}

impl Deferrable for dyn Alpha {
    fn defer(reference: ForwardRef<Self>) -> Arc<Self> {
        Arc::new(reference)
    }
}

impl Deferrable for dyn Beta {
    fn defer(reference: ForwardRef<Self>) -> Arc<Self> {
        Arc::new(reference)
    }
}

impl Deferrable for dyn Gamma {
    fn defer(reference: ForwardRef<Self>) -> Arc<Self> {
        Arc::new(reference)
    }
}

const ALPHA: Key<dyn Alpha> = Key::new("A");
const BETA: Key<dyn Beta> = Key::new("B");
const GAMMA: Key<dyn Gamma> = Key::new("C");

fn triangle_builder() -> ContainerBuilder {
    let mut builder = ContainerBuilder::new();
    builder
        .register_deferrable_singleton(ALPHA, BETA, |beta| {
            let alpha: Arc<dyn Alpha> = Arc::new(AlphaImpl { beta });
            Ok(alpha)
        })
        .unwrap()
        .register_deferrable_singleton(BETA, GAMMA, |gamma| {
            let beta: Arc<dyn Beta> = Arc::new(BetaImpl { gamma });
            Ok(beta)
        })
        .unwrap()
        .register_deferrable_singleton(GAMMA, ALPHA, |alpha| {
            let gamma: Arc<dyn Gamma> = Arc::new(GammaImpl { alpha });
            Ok(gamma)
        })
        .unwrap();
    builder
}

#[test]
fn test_three_member_cycle_points_back_to_singletons() {
    let container = triangle_builder().build();

    let alpha = container.get(&ALPHA).unwrap();
    let beta = container.get(&BETA).unwrap();
    let gamma = container.get(&GAMMA).unwrap();

    let round_trip = alpha.beta().unwrap().gamma().unwrap().alpha().unwrap();
    assert_eq!(round_trip.address().unwrap(), address_of(alpha.as_ref()));
    assert_eq!(alpha.beta().unwrap().address().unwrap(), address_of(beta.as_ref()));
    assert_eq!(beta.gamma().unwrap().address().unwrap(), address_of(gamma.as_ref()));
    assert_eq!(container.stats().built_singletons, 3);
}

#[test]
fn test_three_member_cycle_resolves_for_every_entry_point() {
    for start in ["A", "B", "C"] {
        let container = triangle_builder().build();
        container.resolve_by_name(start).unwrap();

        let gamma = container.get(&GAMMA).unwrap();
        let alpha = container.get(&ALPHA).unwrap();
        let through_cycle = gamma.alpha().unwrap().beta().unwrap().gamma().unwrap();
        assert_eq!(through_cycle.address().unwrap(), address_of(gamma.as_ref()));
        assert_eq!(gamma.alpha().unwrap().address().unwrap(), address_of(alpha.as_ref()));
    }
}

// 单例自环

trait Node: Send + Sync {
    fn me(&self) -> DependencyResult<Arc<dyn Node>>;
    fn address(&self) -> DependencyResult<usize>;
}

struct SelfReferencing {
    me: Arc<dyn Node>,
}

impl Node for SelfReferencing {
    fn me(&self) -> DependencyResult<Arc<dyn Node>> {
        Ok(Arc::clone(&self.me))
    }

    fn address(&self) -> DependencyResult<usize> {
        Ok(address_of(self))
    }
}

impl Node for ForwardRef<dyn Node> {
    fn me(&self) -> DependencyResult<Arc<dyn Node>> {
        self.target()?.me()
    }

    fn address(&self) -> DependencyResult<usize> {
        self.target()?.address()
    }
}

impl Deferrable for dyn Node {
    fn defer(reference: ForwardRef<Self>) -> Arc<Self> {
        Arc::new(reference)
    }
}

#[test]
fn test_singleton_self_loop_resolves() {
    const NODE: Key<dyn Node> = Key::new("Node");

    let mut builder = ContainerBuilder::new();
    builder
        .register_deferrable_singleton(NODE, NODE, |me| {
            let node: Arc<dyn Node> = Arc::new(SelfReferencing { me });
            Ok(node)
        })
        .unwrap();
    let container = builder.build();

    let node = container.get(&NODE).unwrap();
    assert_eq!(node.me().unwrap().address().unwrap(), address_of(node.as_ref()));
}

#[test]
fn test_transient_self_loop_fails() {
    const LOOP: Key<u32> = Key::new("Loop");

    let mut builder = ContainerBuilder::new();
    builder
        .register_transient(LOOP, LOOP, |value| Ok(Arc::new(*value + 1)))
        .unwrap();
    let container = builder.build();

    match container.get(&LOOP).unwrap_err() {
        DependencyError::CircularDependency { key_name, cycle } => {
            assert_eq!(key_name, "Loop");
            assert_eq!(cycle.to_string(), "Loop-->Loop");
        }
        other => panic!("意外的错误: {other}"),
    }
}

#[test]
fn test_cycle_with_one_transient_member_fails_for_every_member() {
    const FIRST: Key<u32> = Key::new("First");
    const SECOND: Key<u32> = Key::new("Second");
    const THIRD: Key<u32> = Key::new("Third");

    let mut builder = ContainerBuilder::new();
    builder
        .register_singleton(FIRST, SECOND, |value| Ok(Arc::new(*value)))
        .unwrap()
        .register_transient(SECOND, THIRD, |value| Ok(Arc::new(*value)))
        .unwrap()
        .register_singleton(THIRD, FIRST, |value| Ok(Arc::new(*value)))
        .unwrap();
    let container = builder.build();

    for key in [FIRST, SECOND, THIRD] {
        match container.get(&key).unwrap_err() {
            DependencyError::CircularDependency { key_name, cycle } => {
                assert!(["First", "Second", "Third"].contains(&key_name.as_str()));
                assert_eq!(cycle.root(), Some(key.name()));
                assert_eq!(cycle.leaf(), Some(key.name()));
                assert_eq!(cycle.len(), 4);
            }
            other => panic!("意外的错误: {other}"),
        }
    }
    assert_eq!(container.stats().built_singletons, 0);
}

#[test]
fn test_plain_singleton_cannot_close_cycle() {
    const LEFT: Key<u32> = Key::new("Left");
    const RIGHT: Key<u32> = Key::new("Right");

    let mut builder = ContainerBuilder::new();
    builder
        .register_singleton(LEFT, RIGHT, |value| Ok(Arc::new(*value)))
        .unwrap()
        .register_singleton(RIGHT, LEFT, |value| Ok(Arc::new(*value)))
        .unwrap();
    let container = builder.build();

    match container.get(&LEFT).unwrap_err() {
        DependencyError::ForwardReferenceUnsupported { key_name, cycle } => {
            assert_eq!(key_name, "Left");
            assert_eq!(cycle.to_string(), "Left-->Right-->Left");
        }
        other => panic!("意外的错误: {other}"),
    }
}

// 构造期间读取依赖环成员

trait ItemWithName: Send + Sync {
    fn name(&self) -> DependencyResult<String>;
}

trait ItemWithCount: Send + Sync {
    fn count(&self) -> DependencyResult<usize>;
}

struct NamedItem {
    counted: Arc<dyn ItemWithCount>,
}

impl ItemWithName for NamedItem {
    fn name(&self) -> DependencyResult<String> {
        Ok(format!("item x{}", self.counted.count()?))
    }
}

struct CountedItem {
    count: usize,
}

impl ItemWithCount for CountedItem {
    fn count(&self) -> DependencyResult<usize> {
        Ok(self.count)
    }
}

impl ItemWithName for ForwardRef<dyn ItemWithName> {
    fn name(&self) -> DependencyResult<String> {
        self.target()?.name()
    }
}

impl Deferrable for dyn ItemWithName {
    fn defer(reference: ForwardRef<Self>) -> Arc<Self> {
        Arc::new(reference)
    }
}

impl ItemWithCount for ForwardRef<dyn ItemWithCount> {
    fn count(&self) -> DependencyResult<usize> {
        self.target()?.count()
    }
}

impl Deferrable for dyn ItemWithCount {
    fn defer(reference: ForwardRef<Self>) -> Arc<Self> {
        Arc::new(reference)
    }
}

const ITEM_WITH_NAME: Key<dyn ItemWithName> = Key::new("ItemWithName");
const ITEM_WITH_COUNT: Key<dyn ItemWithCount> = Key::new("ItemWithCount");

#[test]
fn test_reading_cycle_member_during_construction_fails() {
    let mut builder = ContainerBuilder::new();
    builder
        .register_deferrable_singleton(ITEM_WITH_NAME, ITEM_WITH_COUNT, |counted| {
            let item: Arc<dyn ItemWithName> = Arc::new(NamedItem { counted });
            Ok(item)
        })
        .unwrap()
        .register_deferrable_singleton(ITEM_WITH_COUNT, ITEM_WITH_NAME, |named| {
            // 构造期间读取尚未完成的成员
            let count = named.name()?.len();
            let item: Arc<dyn ItemWithCount> = Arc::new(CountedItem { count });
            Ok(item)
        })
        .unwrap();
    let container = builder.build();

    match container.get(&ITEM_WITH_NAME) {
        Err(DependencyError::UninitializedPropertyAccess { key_name }) => {
            assert_eq!(key_name, "ItemWithName");
        }
        Err(other) => panic!("意外的错误: {other}"),
        Ok(_) => panic!("构造期间读取依赖环成员应当失败"),
    }
    assert_eq!(container.stats().built_singletons, 0);
}

#[test]
fn test_pending_forward_bound_by_next_successful_commit() {
    let failed_once = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&failed_once);

    let mut builder = ContainerBuilder::new();
    builder
        .register_deferrable_singleton(ITEM_WITH_NAME, ITEM_WITH_COUNT, move |counted| {
            if !flag.swap(true, Ordering::SeqCst) {
                return Err(DependencyError::DependencyResolutionFailed {
                    key_name: "ItemWithName".to_string(),
                    message: "首次构造失败".to_string(),
                });
            }
            let item: Arc<dyn ItemWithName> = Arc::new(NamedItem { counted });
            Ok(item)
        })
        .unwrap()
        .register_deferrable_singleton(ITEM_WITH_COUNT, ITEM_WITH_NAME, |_named| {
            let item: Arc<dyn ItemWithCount> = Arc::new(CountedItem { count: 3 });
            Ok(item)
        })
        .unwrap();
    let container = builder.build();

    assert!(container.get(&ITEM_WITH_NAME).is_err());
    let stats = container.stats();
    assert_eq!(stats.built_singletons, 1);
    assert_eq!(stats.pending_forward_references, 1);

    let named = container.get(&ITEM_WITH_NAME).unwrap();
    assert_eq!(named.name().unwrap(), "item x3");
    assert_eq!(container.stats().pending_forward_references, 0);
    assert!(failed_once.load(Ordering::SeqCst));
}
