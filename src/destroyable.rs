/// Breaks subscriptions that would otherwise keep a shared session alive.
pub trait Destroyable {
    fn destroy(&mut self);
}
