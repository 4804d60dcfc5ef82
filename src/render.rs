//! Render Dispatcher
//!
//! Builds the full page for the current screen. Rendering is a pure
//! function of the application state and the tab caches; mounting it and
//! running tab hooks is left to the controller.

use leptos::*;

use crate::dom::{Action, Binding, View};
use crate::state::{AppState, Feature, Screen, Tab};
use crate::tabs::{CategoriesTab, SearchTab, TabComponent};

pub const BEGIN_BUTTON_ID: &str = "begin-btn";
pub const INSIGHT_BUTTON_ID: &str = "insight-btn";
pub const TAB_CONTENT_ID: &str = "tab-content";

pub fn tab_button_id(tab: Tab) -> String {
    format!("tab-{}", tab.key())
}

/// The tab components whose fragments appear on the banking screen
pub struct Tabs<'a> {
    pub categories: &'a CategoriesTab,
    pub search: &'a SearchTab,
}

pub fn render_screen(state: &AppState, tabs: &Tabs<'_>) -> View {
    match state.screen {
        Screen::Startup => startup_screen(state),
        Screen::Banking => banking_screen(state, tabs),
    }
}

fn startup_screen(state: &AppState) -> View {
    let status = state.status;
    View::render(move || {
        view! {
            <div class="min-h-screen flex items-center justify-center bg-gray-50">
                <div class="max-w-md w-full bg-white rounded-xl shadow p-8">
                    <h1 class="text-2xl font-semibold mb-2">"Bank Dashboard"</h1>
                    <p class="text-gray-600 mb-6">
                        "Complete the workshop modules to unlock each part of the app."
                    </p>
                    <ul class="mb-8">
                        {Feature::ALL
                            .into_iter()
                            .map(|feature| {
                                let (mark, class) = if status.is_unlocked(feature) {
                                    ("✓", "text-green-600")
                                } else {
                                    ("○", "text-gray-400")
                                };
                                view! {
                                    <li class="flex items-center gap-3 py-2">
                                        <span class=class>{mark}</span>
                                        <span class="font-medium">{feature.module()}</span>
                                        <span class="text-sm text-gray-500">
                                            {format!("unlocks {}", feature.label())}
                                        </span>
                                    </li>
                                }
                            })
                            .collect_view()}
                    </ul>
                    <div class="flex gap-3">
                        <button
                            id=BEGIN_BUTTON_ID
                            class="flex-1 px-4 py-2 bg-gray-900 text-white rounded-lg hover:bg-gray-800"
                        >
                            "Open Banking App"
                        </button>
                        <InsightButton/>
                    </div>
                </div>
            </div>
        }
    })
    .bind(Binding::click(BEGIN_BUTTON_ID, Action::Begin))
    .bind(Binding::click(INSIGHT_BUTTON_ID, Action::OpenInsight))
}

#[component]
fn InsightButton() -> impl IntoView {
    view! {
        <button id=INSIGHT_BUTTON_ID class="px-4 py-2 border border-gray-300 rounded-lg hover:bg-gray-50">
            "Open Insight"
        </button>
    }
}

fn banking_screen(state: &AppState, tabs: &Tabs<'_>) -> View {
    let mut bindings = vec![Binding::click(INSIGHT_BUTTON_ID, Action::OpenInsight)];
    bindings.extend(
        Tab::ALL
            .into_iter()
            .filter(|tab| tab.is_reachable(&state.status))
            .map(|tab| Binding::click(tab_button_id(tab), Action::SwitchTab(tab))),
    );

    let content = tab_content(state, tabs);
    bindings.extend(content.bindings);

    let (status, active_tab) = (state.status, state.active_tab);
    let content = content.html;
    View::render(move || {
        view! {
            <div class="min-h-screen bg-white">
                <header class="flex items-center justify-between px-8 py-4 border-b border-gray-200">
                    <h1 class="text-xl font-semibold">"Bank Dashboard"</h1>
                    <InsightButton/>
                </header>
                <nav class="flex gap-1 px-8 border-b border-gray-200">
                    {Tab::ALL
                        .into_iter()
                        .map(|tab| {
                            let reachable = tab.is_reachable(&status);
                            let class = if !reachable {
                                "px-4 py-3 text-sm text-gray-300 cursor-not-allowed"
                            } else if tab == active_tab {
                                "px-4 py-3 text-sm font-medium border-b-2 border-gray-900"
                            } else {
                                "px-4 py-3 text-sm text-gray-600 hover:text-gray-900"
                            };
                            let title = (!reachable).then(|| {
                                let module = tab.feature().map(Feature::module).unwrap_or_default();
                                format!("Complete the {} module to unlock", module)
                            });
                            view! {
                                <button id=tab_button_id(tab) class=class disabled={!reachable} title=title>
                                    {tab.label()}
                                </button>
                            }
                        })
                        .collect_view()}
                </nav>
                <main id=TAB_CONTENT_ID class="p-8" inner_html=content></main>
            </div>
        }
    })
    .with_bindings(bindings)
}

fn tab_content(state: &AppState, tabs: &Tabs<'_>) -> View {
    let tab = state.active_tab;
    if let Some(feature) = tab.feature().filter(|f| !state.status.is_unlocked(*f)) {
        return View::render(move || view! { <LockedPanel feature=feature/> });
    }

    match tab {
        Tab::Categories => tabs.categories.render(),
        Tab::Search => tabs.search.render(),
        Tab::Transactions | Tab::Timeseries => {
            let selected = state.selected_transaction.clone();
            View::render(move || view! { <PlaceholderPanel tab=tab selected=selected/> })
        }
    }
}

#[component]
fn LockedPanel(feature: Feature) -> impl IntoView {
    view! {
        <div class="flex flex-col items-center justify-center py-24 text-gray-500">
            <div class="text-4xl mb-4">"🔒"</div>
            <h2 class="text-lg font-medium text-gray-900">
                {format!("{} is locked", feature.label())}
            </h2>
            <p class="text-sm mt-2">
                {format!("Complete the {} module to unlock this tab.", feature.module())}
            </p>
        </div>
    }
}

/// Tabs whose content lives outside this app
#[component]
fn PlaceholderPanel(tab: Tab, selected: Option<String>) -> impl IntoView {
    view! {
        <div class="py-8">
            <h2 class="text-lg font-medium mb-4">{tab.label()}</h2>
            {selected.map(|id| {
                view! { <p class="text-sm text-gray-600">{format!("Selected transaction: {}", id)}</p> }
            })}
        </div>
    }
}
