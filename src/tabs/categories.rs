//! Spending Categories Tab
//!
//! Lists the top spending categories and drills down into the top merchants
//! of the selected one. The list loads automatically on every mount.

use leptos::*;
use std::cell::RefCell;
use std::rc::Rc;

use super::{format_amount, Notice, RequestSeq, TabComponent, TabContext};
use crate::api::{CategoryTotal, MerchantTotal};
use crate::config::DashboardConfig;
use crate::dom::{Action, Binding, View};
use crate::render::TAB_CONTENT_ID;

pub const CATEGORIES_LIST_ID: &str = "categories-list";
pub const CATEGORY_MERCHANTS_ID: &str = "category-merchants";
pub const REFRESH_BUTTON_ID: &str = "refresh-categories";

const BUTTON_CLASS: &str =
    "w-full text-left px-4 py-3 rounded-lg hover:bg-gray-50 transition-colors border border-gray-200";
const SELECTED_BUTTON_CLASS: &str =
    "w-full text-left px-4 py-3 rounded-lg transition-colors border bg-gray-50 border-gray-300";

/// Element id of the n-th category button
pub fn category_button_id(index: usize) -> String {
    format!("category-{}", index)
}

/// Data the categories tab keeps between renders
#[derive(Debug, Clone, Default)]
pub struct CategoriesCache {
    /// `None` until the first list load completes
    pub categories: Option<Vec<CategoryTotal>>,
    pub selected: Option<String>,
    /// Merchants of `selected`; `None` while they are being fetched
    pub merchants: Option<Vec<MerchantTotal>>,
    /// A list load is in flight
    pub loading: bool,
    list_requests: RequestSeq,
    merchant_requests: RequestSeq,
}

#[derive(Clone)]
pub struct CategoriesTab {
    ctx: TabContext,
    cache: Rc<RefCell<CategoriesCache>>,
    category_limit: usize,
    merchant_limit: usize,
}

impl CategoriesTab {
    pub fn new(ctx: TabContext, config: &DashboardConfig) -> Self {
        Self {
            ctx,
            cache: Rc::new(RefCell::new(CategoriesCache::default())),
            category_limit: config.category_limit,
            merchant_limit: config.merchant_limit,
        }
    }

    /// Snapshot of the cache
    pub fn cache(&self) -> CategoriesCache {
        self.cache.borrow().clone()
    }

    /// True while the list or the selected category's merchants are loading
    pub fn is_loading(&self) -> bool {
        let cache = self.cache.borrow();
        cache.loading || (cache.selected.is_some() && cache.merchants.is_none())
    }

    /// Fetch the top categories and patch the list when they arrive
    pub fn load(&self) {
        let (request, show_loading) = {
            let mut cache = self.cache.borrow_mut();
            cache.loading = true;
            (cache.list_requests.issue(), cache.categories.is_none())
        };
        if show_loading {
            self.update_list();
        }

        let this = self.clone();
        self.ctx.spawn(Box::pin(async move {
            let categories = match this.ctx.backend.top_categories(this.category_limit).await {
                Ok(categories) => categories,
                Err(e) => {
                    tracing::warn!("Failed to load categories: {}", e);
                    Vec::new()
                }
            };

            {
                let mut cache = this.cache.borrow_mut();
                if !cache.list_requests.is_current(request) {
                    tracing::debug!(request, "Discarding superseded category list");
                    return;
                }
                cache.categories = Some(categories);
                cache.loading = false;
            }
            this.update_list();
        }));
    }

    /// Fetch the top merchants for `category`. The response is only kept if
    /// `category` is still the selection and no newer merchant request was
    /// issued in the meantime.
    pub fn load_merchants(&self, category: String) {
        let request = self.cache.borrow_mut().merchant_requests.issue();

        let this = self.clone();
        self.ctx.spawn(Box::pin(async move {
            let merchants = match this
                .ctx
                .backend
                .category_merchants(&category, this.merchant_limit)
                .await
            {
                Ok(merchants) => merchants,
                Err(e) => {
                    tracing::warn!(%category, "Failed to load category merchants: {}", e);
                    Vec::new()
                }
            };

            {
                let mut cache = this.cache.borrow_mut();
                if cache.selected.as_deref() != Some(category.as_str())
                    || !cache.merchant_requests.is_current(request)
                {
                    tracing::debug!(%category, request, "Discarding superseded merchants");
                    return;
                }
                cache.merchants = Some(merchants);
            }
            this.update_merchants();
        }));
    }

    /// Select a category: the merchant panel appears, so the whole tab
    /// fragment is repainted before its merchants are fetched.
    pub fn select(&self, category: String) {
        {
            let mut cache = self.cache.borrow_mut();
            cache.selected = Some(category.clone());
            cache.merchants = None;
        }
        self.ctx.patch(TAB_CONTENT_ID, self.render());
        self.load_merchants(category);
    }

    /// Reload the list and, when a category is selected, its merchants
    pub fn refresh(&self) {
        self.load();
        let selected = self.cache.borrow().selected.clone();
        if let Some(category) = selected {
            self.load_merchants(category);
        }
    }

    pub fn update_list(&self) -> bool {
        let cache = self.cache();
        let bindings = list_bindings(&cache);
        let view = View::render(move || list_markup(&cache)).with_bindings(bindings);
        self.ctx.patch(CATEGORIES_LIST_ID, view)
    }

    pub fn update_merchants(&self) -> bool {
        let cache = self.cache();
        self.ctx
            .patch(CATEGORY_MERCHANTS_ID, View::render(move || merchants_markup(&cache)))
    }
}

fn list_bindings(cache: &CategoriesCache) -> Vec<Binding> {
    cache
        .categories
        .iter()
        .flatten()
        .enumerate()
        .map(|(i, cat)| {
            Binding::click(
                category_button_id(i),
                Action::SelectCategory(cat.category.clone()),
            )
        })
        .collect()
}

fn list_markup(cache: &CategoriesCache) -> leptos::View {
    let categories = match &cache.categories {
        None if cache.loading => {
            return view! { <Notice message="Loading categories..."/> }.into_view()
        }
        None => return view! { <Notice message="Click refresh to load categories"/> }.into_view(),
        Some(categories) if categories.is_empty() => {
            return view! {
                <Notice message="No categories found. Complete the Sorted Set module to see data."/>
            }
            .into_view()
        }
        Some(categories) => categories.clone(),
    };

    let selected = cache.selected.clone();
    view! {
        <div class="space-y-2">
            {categories
                .into_iter()
                .enumerate()
                .map(|(i, cat)| {
                    let class = if selected.as_deref() == Some(cat.category.as_str()) {
                        SELECTED_BUTTON_CLASS
                    } else {
                        BUTTON_CLASS
                    };
                    let total = format_amount(cat.total_spent);
                    view! {
                        <button id=category_button_id(i) class=class>
                            <div class="flex items-center justify-between">
                                <span class="font-medium">{cat.category}</span>
                                <span class="text-sm text-gray-600">{total}</span>
                            </div>
                        </button>
                    }
                })
                .collect_view()}
        </div>
    }
    .into_view()
}

fn merchants_markup(cache: &CategoriesCache) -> leptos::View {
    let merchants = match &cache.merchants {
        _ if cache.selected.is_none() => {
            return view! { <Notice message="Select a category to view top merchants"/> }
                .into_view()
        }
        None => return view! { <Notice message="Loading..."/> }.into_view(),
        Some(merchants) if merchants.is_empty() => {
            return view! { <Notice message="No merchants found for this category."/> }.into_view()
        }
        Some(merchants) => merchants.clone(),
    };

    view! {
        <div class="border border-gray-200 rounded-lg overflow-hidden">
            <table class="w-full">
                <thead class="bg-gray-50 border-b border-gray-200">
                    <tr>
                        <th class="text-left px-4 py-3 text-sm font-medium text-gray-600">"Merchant"</th>
                        <th class="text-right px-4 py-3 text-sm font-medium text-gray-600">"Total Spent"</th>
                    </tr>
                </thead>
                <tbody>
                    {merchants
                        .into_iter()
                        .map(|m| {
                            let amount = format_amount(m.amount);
                            view! {
                                <tr class="border-b border-gray-100">
                                    <td class="px-4 py-3 text-sm">{m.merchant}</td>
                                    <td class="px-4 py-3 text-sm text-right font-medium">{amount}</td>
                                </tr>
                            }
                        })
                        .collect_view()}
                </tbody>
            </table>
        </div>
    }
    .into_view()
}

fn tab_markup(cache: &CategoriesCache) -> leptos::View {
    let detail = match cache.selected.clone() {
        Some(category) => view! {
            <div class="flex-1">
                <h3 class="text-lg font-medium mb-6">{format!("Top Merchants: {}", category)}</h3>
                <div id=CATEGORY_MERCHANTS_ID>{merchants_markup(cache)}</div>
            </div>
        }
        .into_view(),
        None => view! {
            <div class="flex-1">
                <div class="flex items-center justify-center h-full text-gray-500">
                    "Select a category to view top merchants"
                </div>
            </div>
        }
        .into_view(),
    };

    view! {
        <div class="flex gap-6">
            <div class="w-80">
                <div class="flex items-center justify-between mb-6">
                    <h2 class="text-lg font-medium">"Top Categories"</h2>
                    <button
                        id=REFRESH_BUTTON_ID
                        class="px-4 py-2 text-sm bg-gray-100 rounded-lg hover:bg-gray-200 transition-colors"
                    >
                        "Refresh"
                    </button>
                </div>
                <div id=CATEGORIES_LIST_ID>{list_markup(cache)}</div>
            </div>
            {detail}
        </div>
    }
    .into_view()
}

impl TabComponent for CategoriesTab {
    fn render(&self) -> View {
        let cache = self.cache();
        let bindings = list_bindings(&cache);
        View::render(move || tab_markup(&cache))
            .bind(Binding::click(REFRESH_BUTTON_ID, Action::RefreshCategories))
            .with_bindings(bindings)
    }

    fn on_mount(&self) {
        self.load();
    }
}
