//! The cart synchronizer: in-memory state, local cache, remote mirror.
//!
//! Mutations are synchronous against in-memory state; the local cache is
//! rewritten on every mutation; the matching remote write is dispatched
//! fire-and-forget. Remote calls may complete in any order, arbitrarily after
//! the local mutation, or never - the remote tier is an eventually-consistent
//! mirror, and the local state is authoritative for what the user sees.

use std::sync::Arc;

use tracing::{debug, warn};

use ladle_core::{CartLine, CartState, ProductRef, RecipeId, RemoteEffect};

use crate::cache::CartCache;
use crate::remote::{RemoteCollection, RemoteError};

/// Executes pending remote effects produced by cart transitions.
///
/// Kept separate from the synchronizer so the reconciliation logic stays pure
/// and the I/O stays mockable.
pub struct EffectRunner {
    remote: Arc<dyn RemoteCollection>,
}

impl EffectRunner {
    /// Create a runner over a remote collection.
    #[must_use]
    pub fn new(remote: Arc<dyn RemoteCollection>) -> Self {
        Self { remote }
    }

    /// The underlying remote collection.
    #[must_use]
    pub fn remote(&self) -> &Arc<dyn RemoteCollection> {
        &self.remote
    }

    /// Execute one effect, surfacing the outcome to the caller.
    pub async fn run(&self, effect: &RemoteEffect) -> Result<(), RemoteError> {
        execute(self.remote.as_ref(), effect).await
    }

    /// Dispatch one effect fire-and-forget.
    ///
    /// Failures are logged and dropped: no retry, no rollback of the local
    /// mutation, no feedback into cart state. In-flight writes started by a
    /// since-superseded local state are not cancelled, so the last write to
    /// land is not guaranteed to match the last local state.
    pub fn spawn(&self, effect: RemoteEffect) {
        // Local mutations must never fail on account of the mirror: without a
        // runtime the effect is dropped and the remote catches up at the next
        // session-start hydrate.
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(?effect, "no async runtime, dropping remote cart effect");
            return;
        };

        let remote = Arc::clone(&self.remote);
        handle.spawn(async move {
            if let Err(error) = execute(remote.as_ref(), &effect).await {
                warn!(%error, ?effect, "remote cart sync failed");
            }
        });
    }
}

async fn execute(remote: &dyn RemoteCollection, effect: &RemoteEffect) -> Result<(), RemoteError> {
    match effect {
        RemoteEffect::Upsert(line) => remote.create_or_set_line(line).await,
        RemoteEffect::AdjustQuantity { id, delta } => remote.adjust_quantity(id, *delta).await,
        RemoteEffect::Delete(id) => remote.delete_line(id).await,
    }
}

/// Owns the cart state and reconciles mutations across the three tiers.
///
/// Constructed once per session and handed to whatever UI layer needs it;
/// `&mut self` on the mutating operations enforces the single-owner model.
pub struct CartSynchronizer {
    state: CartState,
    cache: Box<dyn CartCache>,
    runner: EffectRunner,
}

impl CartSynchronizer {
    /// Create a synchronizer, hydrating state from the local cache.
    ///
    /// Cache misses and corrupt data yield an empty cart.
    #[must_use]
    pub fn new(cache: Box<dyn CartCache>, remote: Arc<dyn RemoteCollection>) -> Self {
        let state = CartState::from_lines(cache.load());
        debug!(lines = state.len(), "cart synchronizer initialized from cache");
        Self {
            state,
            cache,
            runner: EffectRunner::new(remote),
        }
    }

    /// Replace local state with the remote collection's contents.
    ///
    /// Awaited at session start; this is the one place a remote failure is
    /// surfaced, so the caller can fall back to the cached mirror.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] if the remote scan fails; local state is left
    /// untouched.
    pub async fn hydrate_from_remote(&mut self) -> Result<(), RemoteError> {
        let lines = self.runner.remote().fetch_all_lines().await?;
        self.state.hydrate(lines);
        self.persist();
        Ok(())
    }

    /// Add one unit of a product to the cart.
    pub fn add(&mut self, product: &ProductRef) {
        let effect = self.state.add(product);
        self.persist();
        self.runner.spawn(effect);
    }

    /// Increment the quantity of a line; silent no-op when absent.
    pub fn increment(&mut self, id: &RecipeId) {
        let effect = self.state.increment(id);
        self.persist();
        if let Some(effect) = effect {
            self.runner.spawn(effect);
        }
    }

    /// Decrement the quantity of a line; silent no-op when absent or at
    /// quantity 1.
    pub fn decrement(&mut self, id: &RecipeId) {
        let effect = self.state.decrement(id);
        self.persist();
        if let Some(effect) = effect {
            self.runner.spawn(effect);
        }
    }

    /// Remove a line; silent no-op when absent.
    pub fn remove(&mut self, id: &RecipeId) {
        let effect = self.state.remove(id);
        self.persist();
        if let Some(effect) = effect {
            self.runner.spawn(effect);
        }
    }

    /// The current cart state.
    #[must_use]
    pub fn state(&self) -> &CartState {
        &self.state
    }

    /// The cart lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        self.state.lines()
    }

    /// Sum of all line quantities, for the badge/indicator display.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.state.total_quantity()
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// The effect runner, for callers that execute effects themselves.
    #[must_use]
    pub fn runner(&self) -> &EffectRunner {
        &self.runner
    }

    fn persist(&self) {
        self.cache.save(self.state.lines());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use ladle_core::{CartLine, Quantity};

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum RemoteCall {
        Upsert(RecipeId, u32),
        Adjust(RecipeId, i64),
        Delete(RecipeId),
        FetchAll,
    }

    /// Records calls; optionally fails every call.
    struct RecordingRemote {
        calls: Mutex<Vec<RemoteCall>>,
        fetch_result: Vec<CartLine>,
        fail: bool,
    }

    impl RecordingRemote {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fetch_result: Vec::new(),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new()
            }
        }

        fn with_lines(lines: Vec<CartLine>) -> Self {
            Self {
                fetch_result: lines,
                ..Self::new()
            }
        }

        fn record(&self, call: RemoteCall) -> Result<(), RemoteError> {
            self.calls.lock().unwrap().push(call);
            if self.fail {
                return Err(RemoteError::Api {
                    status: 503,
                    message: "backend unavailable".to_owned(),
                });
            }
            Ok(())
        }

        fn calls(&self) -> Vec<RemoteCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RemoteCollection for RecordingRemote {
        async fn create_or_set_line(&self, line: &CartLine) -> Result<(), RemoteError> {
            self.record(RemoteCall::Upsert(line.id.clone(), line.quantity.get()))
        }

        async fn adjust_quantity(&self, id: &RecipeId, delta: i64) -> Result<(), RemoteError> {
            self.record(RemoteCall::Adjust(id.clone(), delta))
        }

        async fn delete_line(&self, id: &RecipeId) -> Result<(), RemoteError> {
            self.record(RemoteCall::Delete(id.clone()))
        }

        async fn fetch_all_lines(&self) -> Result<Vec<CartLine>, RemoteError> {
            self.record(RemoteCall::FetchAll)?;
            Ok(self.fetch_result.clone())
        }
    }

    /// Records every save; loads a fixed initial state.
    struct RecordingCache {
        initial: Vec<CartLine>,
        saves: Arc<Mutex<Vec<Vec<CartLine>>>>,
    }

    impl RecordingCache {
        fn empty() -> (Self, Arc<Mutex<Vec<Vec<CartLine>>>>) {
            Self::with_initial(Vec::new())
        }

        fn with_initial(initial: Vec<CartLine>) -> (Self, Arc<Mutex<Vec<Vec<CartLine>>>>) {
            let saves = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    initial,
                    saves: Arc::clone(&saves),
                },
                saves,
            )
        }
    }

    impl CartCache for RecordingCache {
        fn load(&self) -> Vec<CartLine> {
            self.initial.clone()
        }

        fn save(&self, lines: &[CartLine]) {
            self.saves.lock().unwrap().push(lines.to_vec());
        }
    }

    fn product(id: &str) -> ProductRef {
        ProductRef {
            id: RecipeId::new(id),
            title: id.to_uppercase(),
            photo_url: String::new(),
        }
    }

    fn line(id: &str, quantity: u32) -> CartLine {
        CartLine {
            id: RecipeId::new(id),
            title: id.to_uppercase(),
            quantity: Quantity::new(quantity).unwrap(),
            photo_url: String::new(),
        }
    }

    #[test]
    fn test_initial_state_comes_from_cache() {
        let (cache, _saves) = RecordingCache::with_initial(vec![line("soup", 2)]);
        let sync = CartSynchronizer::new(Box::new(cache), Arc::new(RecordingRemote::new()));

        assert_eq!(sync.total_quantity(), 2);
        assert_eq!(sync.lines(), &[line("soup", 2)]);
    }

    #[test]
    fn test_every_mutation_rewrites_full_cache() {
        let (cache, saves) = RecordingCache::empty();
        let mut sync = CartSynchronizer::new(Box::new(cache), Arc::new(RecordingRemote::new()));

        sync.add(&product("a"));
        sync.add(&product("b"));
        sync.increment(&RecipeId::new("a"));
        sync.remove(&RecipeId::new("b"));

        let saves = saves.lock().unwrap();
        assert_eq!(saves.len(), 4);
        assert_eq!(
            saves.last().unwrap().as_slice(),
            &[line("a", 2)],
            "each save is the whole state, not a diff"
        );
    }

    #[test]
    fn test_noop_mutations_still_persist_current_state() {
        let (cache, saves) = RecordingCache::with_initial(vec![line("soup", 1)]);
        let mut sync = CartSynchronizer::new(Box::new(cache), Arc::new(RecordingRemote::new()));

        sync.decrement(&RecipeId::new("soup"));
        sync.increment(&RecipeId::new("missing"));

        let saves = saves.lock().unwrap();
        assert_eq!(saves.len(), 2);
        assert!(saves.iter().all(|s| s.as_slice() == [line("soup", 1)]));
    }

    #[tokio::test]
    async fn test_runner_maps_effects_to_adapter_calls() {
        let remote = Arc::new(RecordingRemote::new());
        let runner = EffectRunner::new(Arc::clone(&remote) as Arc<dyn RemoteCollection>);

        runner.run(&RemoteEffect::Upsert(line("soup", 1))).await.unwrap();
        runner
            .run(&RemoteEffect::AdjustQuantity {
                id: RecipeId::new("soup"),
                delta: -1,
            })
            .await
            .unwrap();
        runner
            .run(&RemoteEffect::Delete(RecipeId::new("soup")))
            .await
            .unwrap();

        assert_eq!(
            remote.calls(),
            vec![
                RemoteCall::Upsert(RecipeId::new("soup"), 1),
                RemoteCall::Adjust(RecipeId::new("soup"), -1),
                RemoteCall::Delete(RecipeId::new("soup")),
            ]
        );
    }

    #[tokio::test]
    async fn test_remote_failure_leaves_local_state_intact() {
        let (cache, saves) = RecordingCache::empty();
        let remote = Arc::new(RecordingRemote::failing());
        let mut sync =
            CartSynchronizer::new(Box::new(cache), Arc::clone(&remote) as Arc<dyn RemoteCollection>);

        sync.add(&product("soup"));
        let failure = sync
            .runner()
            .run(&RemoteEffect::AdjustQuantity {
                id: RecipeId::new("soup"),
                delta: 1,
            })
            .await;

        assert!(failure.is_err());
        assert_eq!(sync.lines(), &[line("soup", 1)]);
        assert_eq!(saves.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_hydrate_from_remote_replaces_state_and_caches() {
        let (cache, saves) = RecordingCache::with_initial(vec![line("stale", 9)]);
        let remote = Arc::new(RecordingRemote::with_lines(vec![
            line("soup", 2),
            line("toast", 1),
        ]));
        let mut sync =
            CartSynchronizer::new(Box::new(cache), Arc::clone(&remote) as Arc<dyn RemoteCollection>);

        sync.hydrate_from_remote().await.unwrap();

        assert_eq!(sync.lines(), &[line("soup", 2), line("toast", 1)]);
        assert_eq!(
            saves.lock().unwrap().last().unwrap().as_slice(),
            &[line("soup", 2), line("toast", 1)]
        );
        assert_eq!(remote.calls(), vec![RemoteCall::FetchAll]);
    }

    #[tokio::test]
    async fn test_hydrate_failure_keeps_cached_state() {
        let (cache, _saves) = RecordingCache::with_initial(vec![line("soup", 2)]);
        let remote = Arc::new(RecordingRemote::failing());
        let mut sync =
            CartSynchronizer::new(Box::new(cache), Arc::clone(&remote) as Arc<dyn RemoteCollection>);

        assert!(sync.hydrate_from_remote().await.is_err());
        assert_eq!(sync.lines(), &[line("soup", 2)]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_spawned_effects_reach_remote_eventually() {
        let (cache, _saves) = RecordingCache::empty();
        let remote = Arc::new(RecordingRemote::new());
        let mut sync =
            CartSynchronizer::new(Box::new(cache), Arc::clone(&remote) as Arc<dyn RemoteCollection>);

        sync.add(&product("soup"));

        // Fire-and-forget: poll until the spawned task lands.
        for _ in 0..100 {
            if !remote.calls().is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert_eq!(
            remote.calls(),
            vec![RemoteCall::Upsert(RecipeId::new("soup"), 1)]
        );
    }

    #[test]
    fn test_spawn_without_runtime_drops_effect_and_keeps_local_state() {
        let (cache, saves) = RecordingCache::empty();
        let mut sync = CartSynchronizer::new(Box::new(cache), Arc::new(RecordingRemote::new()));

        // No runtime here: the local mutation must still succeed.
        sync.add(&product("soup"));

        assert_eq!(sync.total_quantity(), 1);
        assert_eq!(saves.lock().unwrap().len(), 1);
    }
}
