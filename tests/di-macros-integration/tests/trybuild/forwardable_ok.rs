use di_abstractions::ForwardRef;
use di_macros::forwardable;
use infrastructure_common::DependencyResult;
use std::sync::Arc;

#[forwardable]
pub trait Greeter: Send + Sync {
    fn greet(&self, name: &str) -> DependencyResult<String>;
}

struct Polite;

impl Greeter for Polite {
    fn greet(&self, name: &str) -> DependencyResult<String> {
        Ok(format!("您好，{name}"))
    }
}

fn main() {
    let reference = ForwardRef::<dyn Greeter>::new("Greeter");
    assert!(reference.greet("世界").is_err());

    let target: Arc<dyn Greeter> = Arc::new(Polite);
    reference.bind(&target).unwrap();
    assert_eq!(reference.greet("世界").unwrap(), "您好，世界");
}
