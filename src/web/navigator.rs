use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use askama::Template;
use async_trait::async_trait;
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    db::bill::{BillId, BillStore},
    web::{
        Result,
        bill::presenter::{BillListPresenter, BillsView, DateStyle, ErrorState},
        error::Error,
        modal::ReceiptModal,
        session::UserContext,
        templates::NewBillTemplate,
    },
};

/// Characters escaped when a bill id is used as a single path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Bills,
    NewBill,
    Receipt(BillId),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Bills => "/bills".to_string(),
            Route::NewBill => "/bills/new".to_string(),
            Route::Receipt(id) => {
                format!("/bills/{}/receipt", utf8_percent_encode(&id.0, SEGMENT))
            }
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        match segments.as_slice() {
            ["bills"] => Some(Route::Bills),
            ["bills", "new"] => Some(Route::NewBill),
            ["bills", id, "receipt"] if !id.is_empty() => {
                let id = percent_decode_str(id).decode_utf8().ok()?;
                Some(Route::Receipt(BillId(id.into_owned())))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Page {
    pub status: StatusCode,
    pub html: String,
}

impl IntoResponse for Page {
    fn into_response(self) -> Response {
        (self.status, Html(self.html)).into_response()
    }
}

/// Maps a route to the markup of its page
#[derive(Clone)]
pub struct Pages {
    store: Arc<dyn BillStore>,
    presenter: BillListPresenter,
}

impl Pages {
    pub fn new(store: Arc<dyn BillStore>, user: UserContext, date_style: DateStyle) -> Self {
        Self {
            store,
            presenter: BillListPresenter::new(user, date_style),
        }
    }

    pub fn presenter(&self) -> &BillListPresenter {
        &self.presenter
    }

    pub async fn render(&self, route: &Route) -> Result<Page> {
        match route {
            Route::Bills => {
                let view = self.presenter.load(self.store.as_ref()).await;
                Ok(Page {
                    status: view.status_code(),
                    html: self.presenter.render(&view)?,
                })
            }
            Route::NewBill => Ok(Page {
                status: StatusCode::OK,
                html: NewBillTemplate::new(self.presenter.user()).render()?,
            }),
            Route::Receipt(id) => match self.presenter.load(self.store.as_ref()).await {
                BillsView::Listed(bills) => match bills.find(id) {
                    Some(bill) => {
                        let mut modal = ReceiptModal::default();
                        self.presenter.on_click_view_receipt(bill).dispatch(&mut modal);
                        Ok(Page {
                            status: StatusCode::OK,
                            html: self.presenter.render_list_with_receipt(&bills, &modal)?,
                        })
                    }
                    None => {
                        debug!("no bill {id} to show a receipt for");
                        self.error_page(&ErrorState::NotFound)
                    }
                },
                BillsView::Errored(e) => self.error_page(&e),
            },
        }
    }

    fn error_page(&self, error: &ErrorState) -> Result<Page> {
        Ok(Page {
            status: error.status_code(),
            html: self.presenter.render_error(error)?,
        })
    }
}

#[async_trait]
pub trait Navigator: Send + Sync {
    async fn on_navigate(&self, route: Route) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationTicket(u64);

/// Hands out increasing tickets, only the latest one is current
#[derive(Debug, Default)]
pub struct NavigationTracker {
    latest: AtomicU64,
}

impl NavigationTracker {
    pub fn begin(&self) -> NavigationTicket {
        NavigationTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: NavigationTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}

#[derive(Debug, Default)]
struct DocumentState {
    body: String,
    route: Option<Route>,
}

/// A rendered document whose body is replaced on each navigation.
/// When navigations overlap the last one started wins, responses to older
/// ones are dropped.
pub struct Document {
    pages: Pages,
    tracker: NavigationTracker,
    state: Mutex<DocumentState>,
}

impl Document {
    pub fn new(pages: Pages) -> Self {
        Self {
            pages,
            tracker: NavigationTracker::default(),
            state: Mutex::new(DocumentState::default()),
        }
    }

    pub fn pages(&self) -> &Pages {
        &self.pages
    }

    pub async fn body(&self) -> String {
        self.state.lock().await.body.clone()
    }

    pub async fn route(&self) -> Option<Route> {
        self.state.lock().await.route.clone()
    }

    pub async fn navigate_path(&self, path: &str) -> Result<()> {
        let route = Route::from_path(path)
            .ok_or_else(|| Error::NotFound(format!("no page at {path}")))?;
        self.on_navigate(route).await
    }
}

#[async_trait]
impl Navigator for Document {
    async fn on_navigate(&self, route: Route) -> Result<()> {
        let ticket = self.tracker.begin();
        // render failures become an error page
        let page = match self.pages.render(&route).await {
            Ok(page) => page,
            Err(e) => self
                .pages
                .error_page(&ErrorState::Other(e.to_string()))?,
        };

        let mut state = self.state.lock().await;
        if !self.tracker.is_current(ticket) {
            debug!("dropping stale navigation to {}", route.path());
            return Ok(());
        }
        state.body = page.html;
        state.route = Some(route);
        Ok(())
    }
}
