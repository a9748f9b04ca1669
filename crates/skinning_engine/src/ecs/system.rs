//! System trait

use super::World;

/// System owning components and driving them once per frame
pub trait System {
    /// Name used in log output
    fn name(&self) -> &str;

    /// Run the system for one frame
    fn run(&mut self, world: &mut World);
}
