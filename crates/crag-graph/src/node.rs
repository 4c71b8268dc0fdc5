use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;
use crag_core::CragError;

use crate::State;

/// A step in the graph.
#[async_trait]
pub trait Node<S: State>: Send + Sync {
    async fn process(&self, state: S) -> Result<S::Update, CragError>;
}

/// Wraps an async function as a [`Node`].
pub struct FnNode<S, F, Fut>
where
    S: State,
    F: Fn(S) -> Fut + Send + Sync,
    Fut: Future<Output = Result<S::Update, CragError>> + Send,
{
    func: F,
    _marker: PhantomData<fn(S)>,
}

impl<S, F, Fut> FnNode<S, F, Fut>
where
    S: State,
    F: Fn(S) -> Fut + Send + Sync,
    Fut: Future<Output = Result<S::Update, CragError>> + Send,
{
    pub fn new(func: F) -> Self {
        Self {
            func,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<S, F, Fut> Node<S> for FnNode<S, F, Fut>
where
    S: State,
    F: Fn(S) -> Fut + Send + Sync,
    Fut: Future<Output = Result<S::Update, CragError>> + Send,
{
    async fn process(&self, state: S) -> Result<S::Update, CragError> {
        (self.func)(state).await
    }
}
