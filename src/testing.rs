//! Test doubles shared by the unit tests

use async_trait::async_trait;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use tokio::sync::oneshot;

use crate::api::{ApiError, Backend, CategoryTotal, MerchantTotal, SearchHit, SearchResponse, Timed};
use crate::config::Config;
use crate::controller::Dashboard;
use crate::dom::VirtualDom;
use crate::runtime::TokioScheduler;
use crate::state::{Tab, UnlockStatus};

type Reply<T> = Result<T, ApiError>;

enum Scripted<T> {
    Ready(Reply<T>),
    Deferred(oneshot::Receiver<Reply<T>>),
}

async fn resolve<T>(next: Option<Scripted<T>>) -> Reply<T> {
    match next {
        Some(Scripted::Ready(reply)) => reply,
        Some(Scripted::Deferred(rx)) => rx
            .await
            .unwrap_or_else(|_| Err(ApiError::Transport("request abandoned".into()))),
        None => Err(ApiError::Transport("connection refused".into())),
    }
}

fn defer<T>(queue: &mut VecDeque<Scripted<T>>) -> oneshot::Sender<Reply<T>> {
    let (tx, rx) = oneshot::channel();
    queue.push_back(Scripted::Deferred(rx));
    tx
}

/// Backend answering from per-endpoint queues. An empty queue answers
/// with a transport error.
#[derive(Default)]
pub struct ScriptedBackend {
    status: RefCell<VecDeque<Scripted<UnlockStatus>>>,
    categories: RefCell<VecDeque<Scripted<Vec<CategoryTotal>>>>,
    merchants: RefCell<HashMap<String, VecDeque<Scripted<Vec<MerchantTotal>>>>>,
    search: RefCell<VecDeque<Scripted<Timed<SearchResponse>>>>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_status(&self, reply: Reply<UnlockStatus>) {
        self.status.borrow_mut().push_back(Scripted::Ready(reply));
    }

    pub fn defer_status(&self) -> oneshot::Sender<Reply<UnlockStatus>> {
        defer(&mut self.status.borrow_mut())
    }

    pub fn push_categories(&self, reply: Reply<Vec<CategoryTotal>>) {
        self.categories.borrow_mut().push_back(Scripted::Ready(reply));
    }

    pub fn defer_categories(&self) -> oneshot::Sender<Reply<Vec<CategoryTotal>>> {
        defer(&mut self.categories.borrow_mut())
    }

    pub fn push_merchants(&self, category: &str, reply: Reply<Vec<MerchantTotal>>) {
        self.merchants
            .borrow_mut()
            .entry(category.to_string())
            .or_default()
            .push_back(Scripted::Ready(reply));
    }

    pub fn defer_merchants(&self, category: &str) -> oneshot::Sender<Reply<Vec<MerchantTotal>>> {
        defer(
            self.merchants
                .borrow_mut()
                .entry(category.to_string())
                .or_default(),
        )
    }

    pub fn push_search(&self, reply: Reply<Timed<SearchResponse>>) {
        self.search.borrow_mut().push_back(Scripted::Ready(reply));
    }

    pub fn defer_search(&self) -> oneshot::Sender<Reply<Timed<SearchResponse>>> {
        defer(&mut self.search.borrow_mut())
    }

    /// Every request made so far, e.g. `status` or `merchants:Travel`
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

#[async_trait(?Send)]
impl Backend for ScriptedBackend {
    async fn status(&self) -> Result<UnlockStatus, ApiError> {
        self.record("status".into());
        let next = self.status.borrow_mut().pop_front();
        resolve(next).await
    }

    async fn top_categories(&self, _limit: usize) -> Result<Vec<CategoryTotal>, ApiError> {
        self.record("categories".into());
        let next = self.categories.borrow_mut().pop_front();
        resolve(next).await
    }

    async fn category_merchants(
        &self,
        category: &str,
        _limit: usize,
    ) -> Result<Vec<MerchantTotal>, ApiError> {
        self.record(format!("merchants:{}", category));
        let next = self
            .merchants
            .borrow_mut()
            .get_mut(category)
            .and_then(VecDeque::pop_front);
        resolve(next).await
    }

    async fn search(&self, query: &str, _limit: usize) -> Result<Timed<SearchResponse>, ApiError> {
        self.record(format!("search:{}", query));
        let next = self.search.borrow_mut().pop_front();
        resolve(next).await
    }
}

/// A dashboard wired to a scripted backend and an in-memory page
pub struct Harness {
    pub backend: Rc<ScriptedBackend>,
    pub dom: Rc<VirtualDom>,
    pub dashboard: Dashboard,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let backend = Rc::new(ScriptedBackend::new());
        let dom = Rc::new(VirtualDom::new());
        let dashboard = Dashboard::new(
            &config,
            backend.clone(),
            dom.clone(),
            Rc::new(TokioScheduler),
        );
        Self {
            backend,
            dom,
            dashboard,
        }
    }

    /// Initialize with every module unlocked and show `tab`
    pub fn open_tab(&self, tab: Tab) {
        self.dashboard.initialize();
        self.dashboard.apply_status(UnlockStatus {
            transactions_unlocked: true,
            categories_unlocked: true,
            timeseries_unlocked: true,
        });
        self.dashboard.navigate_to_banking();
        self.dashboard.switch_tab(tab);
    }
}

/// Let spawned local tasks run until they block
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

pub fn category(name: &str, total_spent: f64) -> CategoryTotal {
    CategoryTotal {
        category: name.to_string(),
        total_spent,
    }
}

pub fn merchant(name: &str, amount: f64) -> MerchantTotal {
    MerchantTotal {
        merchant: name.to_string(),
        amount,
    }
}

pub fn hit(merchant: &str, category: &str, score: f64) -> SearchHit {
    SearchHit {
        merchant: merchant.to_string(),
        category: category.to_string(),
        location: "Oakland, CA".to_string(),
        amount: 12.75,
        score,
    }
}

pub fn search_ok(results: Vec<SearchHit>, search_ms: f64, roundtrip_ms: u64) -> Timed<SearchResponse> {
    Timed {
        value: SearchResponse {
            count: Some(results.len()),
            results,
            search_ms,
            error: None,
        },
        roundtrip_ms,
    }
}
