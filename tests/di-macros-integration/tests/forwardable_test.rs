//! `#[forwardable]` 与容器的集成测试

use di_abstractions::{ForwardRef, Key};
use di_impl::ContainerBuilder;
use di_macros::forwardable;
use infrastructure_common::{DependencyError, DependencyResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[forwardable]
pub trait Ping: Send + Sync {
    fn ping(&self, remaining: u32) -> DependencyResult<u32>;
    fn hits(&self) -> DependencyResult<usize>;
}

#[forwardable]
pub trait Pong: Send + Sync {
    fn pong(&self, remaining: u32) -> DependencyResult<u32>;

    fn pong_twice(&self, remaining: u32) -> DependencyResult<u32> {
        let once = self.pong(remaining)?;
        self.pong(once)
    }
}

struct PingService {
    pong: Arc<dyn Pong>,
    hits: AtomicUsize,
}

impl Ping for PingService {
    fn ping(&self, remaining: u32) -> DependencyResult<u32> {
        self.hits.fetch_add(1, Ordering::SeqCst);
        if remaining == 0 {
            return Ok(0);
        }
        self.pong.pong(remaining - 1)
    }

    fn hits(&self) -> DependencyResult<usize> {
        Ok(self.hits.load(Ordering::SeqCst))
    }
}

struct PongService {
    ping: Arc<dyn Ping>,
}

impl Pong for PongService {
    fn pong(&self, remaining: u32) -> DependencyResult<u32> {
        if remaining == 0 {
            return Ok(0);
        }
        self.ping.ping(remaining - 1)
    }
}

const PING: Key<dyn Ping> = Key::new("Ping");
const PONG: Key<dyn Pong> = Key::new("Pong");

fn build_rally() -> di_impl::Container {
    let mut builder = ContainerBuilder::new();
    builder
        .register_deferrable_singleton(PING, PONG, |pong| {
            let ping: Arc<dyn Ping> = Arc::new(PingService {
                pong,
                hits: AtomicUsize::new(0),
            });
            Ok(ping)
        })
        .unwrap()
        .register_deferrable_singleton(PONG, PING, |ping| {
            let pong: Arc<dyn Pong> = Arc::new(PongService { ping });
            Ok(pong)
        })
        .unwrap();
    builder.build()
}

#[test]
fn test_generated_forwarding_resolves_cycle() {
    let container = build_rally();

    let ping = container.get(&PING).unwrap();
    assert_eq!(ping.ping(6).unwrap(), 0);
    // 6、4、2、0 四次经过 ping，其中三次通过前向引用
    assert_eq!(ping.hits().unwrap(), 4);

    let pong = container.get(&PONG).unwrap();
    pong.pong_twice(3).unwrap();
    assert_eq!(ping.hits().unwrap(), 6);
}

#[test]
fn test_generated_forwarding_rejects_early_access() {
    let reference = ForwardRef::<dyn Ping>::new("Ping");
    assert!(matches!(
        reference.hits(),
        Err(DependencyError::UninitializedPropertyAccess { .. })
    ));

    let pong = ForwardRef::<dyn Pong>::new("Pong");
    assert!(pong.pong_twice(2).unwrap_err().is_forward_reference_error());
}
