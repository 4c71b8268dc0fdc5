/// State threaded through a graph run.
///
/// Nodes do not return a whole new state; they return an `Update` that names
/// only the fields they change, and the interpreter applies it with
/// [`merge`](State::merge).
pub trait State: Clone + Send + Sync + 'static {
    type Update: Send + 'static;

    fn merge(&mut self, update: Self::Update);
}
