//! Semantic Search Tab
//!
//! Free-text search over transactions. Nothing is fetched on mount; a
//! search runs when the button is clicked or Enter is pressed in the input.

use leptos::*;
use std::cell::RefCell;
use std::rc::Rc;

use super::{format_amount, Notice, RequestSeq, TabComponent, TabContext};
use crate::api::{ApiError, SearchHit, SearchResponse, Timed};
use crate::config::DashboardConfig;
use crate::dom::{Action, Binding, View};
use crate::toast::{Timing, Toaster};

pub const SEARCH_INPUT_ID: &str = "search-input";
pub const SEARCH_BUTTON_ID: &str = "search-btn";
pub const SEARCH_RESULTS_ID: &str = "search-results";

#[derive(Debug, Clone, Default)]
pub struct SearchCache {
    /// Last submitted query, trimmed
    pub query: String,
    /// `None` until the first search completes
    pub results: Option<Vec<SearchHit>>,
    pub loading: bool,
    requests: RequestSeq,
}

#[derive(Clone)]
pub struct SearchTab {
    ctx: TabContext,
    cache: Rc<RefCell<SearchCache>>,
    toaster: Rc<Toaster>,
    limit: usize,
    min_query_len: usize,
}

impl SearchTab {
    pub fn new(ctx: TabContext, toaster: Rc<Toaster>, config: &DashboardConfig) -> Self {
        Self {
            ctx,
            cache: Rc::new(RefCell::new(SearchCache::default())),
            toaster,
            limit: config.search_limit,
            min_query_len: config.min_query_len,
        }
    }

    pub fn cache(&self) -> SearchCache {
        self.cache.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.cache.borrow().loading
    }

    /// Run a search for whatever is typed into the search input
    pub fn submit(&self) -> bool {
        match self.ctx.surface.input_value(SEARCH_INPUT_ID) {
            Some(value) => self.perform(&value),
            None => {
                tracing::debug!("Search input not mounted");
                false
            }
        }
    }

    /// Search for `query`. Returns `false` when the trimmed query is too
    /// short to be sent.
    pub fn perform(&self, query: &str) -> bool {
        let query = query.trim();
        if query.chars().count() < self.min_query_len {
            tracing::debug!(query, "Ignoring short search query");
            return false;
        }

        let request = {
            let mut cache = self.cache.borrow_mut();
            cache.query = query.to_string();
            cache.loading = true;
            cache.requests.issue()
        };
        self.update();

        let this = self.clone();
        let query = query.to_string();
        self.ctx.spawn(Box::pin(async move {
            let response = this.ctx.backend.search(&query, this.limit).await;
            if !this.cache.borrow().requests.is_current(request) {
                tracing::debug!(%query, request, "Discarding superseded search");
                return;
            }
            this.finish(&query, response);
        }));
        true
    }

    fn finish(&self, query: &str, response: Result<Timed<SearchResponse>, ApiError>) {
        let toast = match response {
            Ok(Timed { value, roundtrip_ms }) => {
                let roundtrip = roundtrip_ms as f64;
                if let Some(error) = value.error {
                    tracing::warn!(query, "Search reported an error: {}", error);
                    self.store(Vec::new());
                    Some(("Search not ready".to_string(), 0.0, roundtrip))
                } else {
                    let message = format!("Found {} results", value.count());
                    self.store(value.results);
                    Some((message, value.search_ms, roundtrip))
                }
            }
            Err(e) => {
                tracing::warn!(query, "Search failed: {}", e);
                self.store(Vec::new());
                None
            }
        };

        self.update();
        if let Some((message, server_ms, roundtrip_ms)) = toast {
            self.toaster.show(
                &message,
                &[
                    Timing::new("FT.SEARCH", server_ms),
                    Timing::new("Roundtrip", roundtrip_ms),
                ],
            );
        }
    }

    fn store(&self, results: Vec<SearchHit>) {
        let mut cache = self.cache.borrow_mut();
        cache.results = Some(results);
        cache.loading = false;
    }

    pub fn update(&self) -> bool {
        let cache = self.cache();
        self.ctx
            .patch(SEARCH_RESULTS_ID, View::render(move || results_markup(&cache)))
    }
}

fn results_markup(cache: &SearchCache) -> leptos::View {
    if cache.loading {
        let message = format!("Searching for \"{}\"...", cache.query);
        return view! { <Notice message=message/> }.into_view();
    }
    let hits = match &cache.results {
        None => {
            return view! {
                <Notice
                    icon="🔍"
                    message="Enter a search query to find transactions"
                    hint="Examples: \"grocery stores\", \"travel expenses\", \"entertainment\""
                />
            }
            .into_view()
        }
        Some(hits) if hits.is_empty() => {
            let message = format!("No results found for \"{}\"", cache.query);
            return view! {
                <Notice
                    message=message
                    hint="Make sure the Vector Search module is complete and transactions have embeddings."
                />
            }
            .into_view();
        }
        Some(hits) => hits.clone(),
    };

    view! {
        <div class="border border-gray-200 rounded-lg overflow-hidden">
            <table class="w-full">
                <thead class="bg-gray-50 border-b border-gray-200">
                    <tr>
                        <th class="text-left px-4 py-3 text-sm font-medium text-gray-600">"Similarity"</th>
                        <th class="text-left px-4 py-3 text-sm font-medium text-gray-600">"Merchant"</th>
                        <th class="text-left px-4 py-3 text-sm font-medium text-gray-600">"Category"</th>
                        <th class="text-left px-4 py-3 text-sm font-medium text-gray-600">"Location"</th>
                        <th class="text-right px-4 py-3 text-sm font-medium text-gray-600">"Amount"</th>
                    </tr>
                </thead>
                <tbody>{hits.into_iter().map(result_row).collect_view()}</tbody>
            </table>
        </div>
    }
    .into_view()
}

fn result_row(hit: SearchHit) -> impl IntoView {
    let similarity = hit.similarity();
    let amount = format_amount(hit.amount);
    view! {
        <tr class="border-b border-gray-100">
            <td class="px-4 py-3">
                <div class="flex items-center gap-2">
                    <div class="w-16 bg-gray-200 rounded-full h-2">
                        <div
                            class="bg-green-500 h-2 rounded-full"
                            style=format!("width: {}%", similarity)
                        ></div>
                    </div>
                    <span class="text-sm text-gray-600">{format!("{}%", similarity)}</span>
                </div>
            </td>
            <td class="px-4 py-3 text-sm font-medium">{hit.merchant}</td>
            <td class="px-4 py-3">
                <span class="px-2 py-1 bg-gray-100 rounded text-sm">{hit.category}</span>
            </td>
            <td class="px-4 py-3 text-sm text-gray-600">{hit.location}</td>
            <td class="px-4 py-3 text-sm text-right font-medium">{amount}</td>
        </tr>
    }
}

fn tab_markup(cache: &SearchCache) -> leptos::View {
    let query = cache.query.clone();
    view! {
        <div>
            <div class="mb-6">
                <h2 class="text-lg font-medium mb-4">"Semantic Transaction Search"</h2>
                <div class="flex gap-3">
                    <input
                        type="text"
                        id=SEARCH_INPUT_ID
                        placeholder="Try: 'coffee shops', 'travel transactions', 'restaurants in Florida'..."
                        class="flex-1 px-4 py-3 border border-gray-200 rounded-lg focus:outline-none focus:border-gray-400"
                        value=query
                    />
                    <button
                        id=SEARCH_BUTTON_ID
                        class="px-6 py-3 bg-black text-white rounded-lg hover:bg-gray-800 transition-colors"
                    >
                        "Search"
                    </button>
                </div>
                <p class="text-xs text-gray-400 mt-2">
                    "Uses vector similarity search to find semantically related transactions"
                </p>
            </div>
            <div id=SEARCH_RESULTS_ID>{results_markup(cache)}</div>
        </div>
    }
    .into_view()
}

impl TabComponent for SearchTab {
    fn render(&self) -> View {
        let cache = self.cache();
        View::render(move || tab_markup(&cache))
            .bind(Binding::click(SEARCH_BUTTON_ID, Action::SubmitSearch))
            .bind(Binding::enter_key(SEARCH_INPUT_ID, Action::SubmitSearch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Surface, VirtualDom};
    use crate::state::Tab;
    use crate::testing::{hit, search_ok, settle, Harness};
    use tokio::task::LocalSet;

    fn coffee_hits() -> Vec<SearchHit> {
        vec![
            hit("Blue Bottle", "Dining", 0.2),
            hit("Starbucks", "Dining", 0.35),
        ]
    }

    #[test]
    fn test_initial_render() {
        let h = Harness::new();
        let view = h.dashboard.search().render();
        let bindings = view.bindings.clone();
        let page = VirtualDom::painted(view);

        assert_eq!(
            page.text_of(SEARCH_RESULTS_ID).as_deref(),
            Some(
                "🔍 Enter a search query to find transactions \
                 Examples: \"grocery stores\", \"travel expenses\", \"entertainment\""
            )
        );
        assert_eq!(
            bindings,
            vec![
                Binding::click(SEARCH_BUTTON_ID, Action::SubmitSearch),
                Binding::enter_key(SEARCH_INPUT_ID, Action::SubmitSearch),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_enter_key_runs_search_and_toasts() {
        LocalSet::new()
            .run_until(async {
                let h = Harness::new();
                h.backend.push_search(Ok(search_ok(coffee_hits(), 1.5, 42)));
                h.open_tab(Tab::Search);
                assert_eq!(h.backend.calls().iter().filter(|c| c.starts_with("search")).count(), 0);

                h.dom.set_input(SEARCH_INPUT_ID, "  coffee ");
                assert!(h.dom.press_enter(SEARCH_INPUT_ID));
                assert_eq!(
                    h.dom.text_of(SEARCH_RESULTS_ID).as_deref(),
                    Some("Searching for \"coffee\"...")
                );

                settle().await;
                let results = h.dom.text_of(SEARCH_RESULTS_ID).unwrap();
                assert!(results.starts_with(
                    "Similarity Merchant Category Location Amount \
                     80% Blue Bottle Dining Oakland, CA $12.75 \
                     65% Starbucks"
                ));
                assert_eq!(h.backend.call_count("search:coffee"), 1);

                let toasts = h.dom.toasts();
                assert_eq!(toasts.len(), 1);
                assert_eq!(
                    toasts[0].text(),
                    "Found 2 results | FT.SEARCH: 1.5ms | Roundtrip: 42ms"
                );
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_query_is_ignored() {
        LocalSet::new()
            .run_until(async {
                let h = Harness::new();
                h.open_tab(Tab::Search);

                h.dom.set_input(SEARCH_INPUT_ID, " a ");
                assert!(h.dom.click(SEARCH_BUTTON_ID));
                settle().await;

                assert_eq!(h.backend.call_count("search"), 0);
                assert_eq!(h.dashboard.search().cache().query, "");
                assert!(!h.dashboard.search().perform("x"));
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_reported_error_shows_not_ready() {
        LocalSet::new()
            .run_until(async {
                let h = Harness::new();
                let mut response = search_ok(Vec::new(), 7.0, 12);
                response.value.error = Some("no such index".into());
                h.backend.push_search(Ok(response));
                h.open_tab(Tab::Search);

                h.dashboard.search().perform("coffee");
                settle().await;

                assert!(h
                    .dom
                    .text_of(SEARCH_RESULTS_ID)
                    .unwrap()
                    .starts_with("No results found for \"coffee\" Make sure the Vector Search module"));
                assert_eq!(
                    h.dom.toasts()[0].text(),
                    "Search not ready | FT.SEARCH: 0ms | Roundtrip: 12ms"
                );
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failure_has_no_toast() {
        LocalSet::new()
            .run_until(async {
                let h = Harness::new();
                h.backend
                    .push_search(Err(ApiError::Transport("connection refused".into())));
                h.open_tab(Tab::Search);

                h.dashboard.search().perform("coffee");
                settle().await;

                assert!(h
                    .dom
                    .text_of(SEARCH_RESULTS_ID)
                    .unwrap()
                    .starts_with("No results found for \"coffee\" Make sure the Vector Search module"));
                assert!(h.dom.toasts().is_empty());
                assert!(!h.dashboard.search().is_loading());
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_search_is_discarded() {
        LocalSet::new()
            .run_until(async {
                let h = Harness::new();
                let slow = h.backend.defer_search();
                h.backend.push_search(Ok(search_ok(
                    vec![hit("Delta", "Travel", 0.1)],
                    2.0,
                    30,
                )));
                h.open_tab(Tab::Search);

                h.dashboard.search().perform("coffee");
                h.dashboard.search().perform("flights");
                settle().await;

                slow.send(Ok(search_ok(coffee_hits(), 1.0, 90))).unwrap();
                settle().await;

                let results = h.dom.text_of(SEARCH_RESULTS_ID).unwrap();
                assert!(results.contains("Delta"));
                assert!(!results.contains("Blue Bottle"));
                assert_eq!(h.dashboard.search().cache().query, "flights");

                let toasts = h.dom.toasts();
                assert_eq!(toasts.len(), 1);
                assert!(toasts[0].text().starts_with("Found 1 results"));
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_survive_tab_switch() {
        LocalSet::new()
            .run_until(async {
                let h = Harness::new();
                h.backend.push_search(Ok(search_ok(coffee_hits(), 1.5, 42)));
                h.open_tab(Tab::Search);
                h.dashboard.search().perform("coffee");
                settle().await;

                h.dashboard.switch_tab(Tab::Transactions);
                assert!(!h.dom.contains(SEARCH_RESULTS_ID));
                h.dashboard.switch_tab(Tab::Search);

                assert!(h.dom.text_of(SEARCH_RESULTS_ID).unwrap().contains("Starbucks"));
                assert_eq!(h.dom.input_value(SEARCH_INPUT_ID).as_deref(), Some("coffee"));
                assert_eq!(h.backend.call_count("search"), 1);
            })
            .await;
    }
}
