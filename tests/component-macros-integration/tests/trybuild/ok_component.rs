use component_macros::Component;
use di_abstractions::{Component as _, Dep};

#[derive(Debug, Default, Component)]
struct Leaf;

#[derive(Debug, Default, Component)]
#[component(name = "ok-service", constructor = "build")]
struct OkService {
    #[dep]
    leaf: Dep<Leaf>,
    #[dep(name = "custom-leaf")]
    other: Dep<Leaf>,
    plain: u32,
}

impl OkService {
    fn build(&self) -> Result<Self, String> {
        Ok(Self {
            leaf: self.leaf.clone(),
            other: self.other.clone(),
            plain: self.plain + 1,
        })
    }
}

fn main() {
    assert_eq!(OkService::component_name(), "ok-service");
    assert!(Leaf::component_name().ends_with("Leaf"));
}
