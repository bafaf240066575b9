use component_macros::Component;
use di_abstractions::{ComponentRegistry, ComponentResolver, Dep};
use di_impl::DiContainerImpl;

trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

trait Named: Send + Sync {
    fn name(&self) -> &str;
}

#[derive(Debug, Default, Component)]
#[component(provides(dyn Clock, dyn Named))]
struct FixedClock {
    at: u64,
}

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.at
    }
}

impl Named for FixedClock {
    fn name(&self) -> &str {
        "fixed"
    }
}

#[derive(Debug, Default, Component)]
struct Scheduler {
    #[dep]
    clock: Dep<dyn Clock>,
}

fn main() {
    let mut container = DiContainerImpl::new();
    container.register(FixedClock { at: 42 }).unwrap();
    container.register(Scheduler::default()).unwrap();

    let scheduler = container.get::<Scheduler>().unwrap().unwrap();
    assert_eq!(scheduler.clock.now(), 42);
    let named = container.get_capability::<dyn Named>().unwrap().unwrap();
    assert_eq!(named.name(), "fixed");
}
