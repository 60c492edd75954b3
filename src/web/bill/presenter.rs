use std::fmt;

use askama::Template;
use axum::http::StatusCode;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, error};
use url::Url;

use crate::{
    db::bill::{Bill, BillId, BillStore, StoreError},
    web::{
        Result,
        bill::data::BillForList,
        modal::{ModalDisplay, ReceiptModal},
        navigator::{Navigator, Route},
        session::UserContext,
        templates::{BillsTemplate, ErrorTemplate, VerticalLayout},
    },
};

/// How dates are displayed in the bill list, always zero-padded
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateStyle {
    #[default]
    Dash,
    Slash,
    Dot,
}

impl DateStyle {
    pub fn format(&self, date: &NaiveDate) -> String {
        let pattern = match self {
            DateStyle::Dash => "%Y-%m-%d",
            DateStyle::Slash => "%Y/%m/%d",
            DateStyle::Dot => "%Y.%m.%d",
        };
        date.format(pattern).to_string()
    }
}

/// Bills, most recent first. Bills on the same day keep their store order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BillList(Vec<Bill>);

impl BillList {
    pub fn new(mut bills: Vec<Bill>) -> Self {
        bills.sort_by(|a, b| b.date.cmp(&a.date));
        Self(bills)
    }

    pub fn bills(&self) -> &[Bill] {
        &self.0
    }

    pub fn find(&self, id: &BillId) -> Option<&Bill> {
        self.0.iter().find(|b| &b.id == id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorState {
    NotFound,
    ServerError,
    Other(String),
}

impl ErrorState {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorState::NotFound => StatusCode::NOT_FOUND,
            ErrorState::ServerError | ErrorState::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ErrorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorState::NotFound => f.write_str("Erreur 404"),
            ErrorState::ServerError => f.write_str("Erreur 500"),
            ErrorState::Other(msg) => f.write_str(msg),
        }
    }
}

impl From<StoreError> for ErrorState {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => ErrorState::NotFound,
            StoreError::Server => ErrorState::ServerError,
            StoreError::Other(msg) => ErrorState::Other(msg),
        }
    }
}

/// Outcome of one fetch for the bill list view
#[derive(Debug, Clone, PartialEq)]
pub enum BillsView {
    Listed(BillList),
    Errored(ErrorState),
}

impl BillsView {
    pub fn status_code(&self) -> StatusCode {
        match self {
            BillsView::Listed(_) => StatusCode::OK,
            BillsView::Errored(e) => e.status_code(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationIntent {
    pub route: Route,
}

impl NavigationIntent {
    pub async fn dispatch(self, navigator: &dyn Navigator) -> Result<()> {
        navigator.on_navigate(self.route).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalIntent {
    pub bill_id: BillId,
    pub receipt_url: Option<Url>,
}

impl ModalIntent {
    pub fn dispatch(self, modal: &mut dyn ModalDisplay) {
        modal.show(&self);
    }
}

#[derive(Debug, Clone)]
pub struct BillListPresenter {
    user: UserContext,
    date_style: DateStyle,
}

impl BillListPresenter {
    pub fn new(user: UserContext, date_style: DateStyle) -> Self {
        Self { user, date_style }
    }

    pub fn user(&self) -> &UserContext {
        &self.user
    }

    /// Fetches the bills once, failures become an error view
    pub async fn load(&self, store: &dyn BillStore) -> BillsView {
        match store.list().await {
            Ok(bills) => {
                debug!("fetched {} bills", bills.len());
                BillsView::Listed(BillList::new(bills))
            }
            Err(e) => {
                error!("Error fetching bills: {e}");
                BillsView::Errored(e.into())
            }
        }
    }

    pub fn render(&self, view: &BillsView) -> Result<String> {
        match view {
            BillsView::Listed(bills) => self.render_list(bills),
            BillsView::Errored(e) => self.render_error(e),
        }
    }

    pub fn render_list(&self, bills: &BillList) -> Result<String> {
        self.render_list_with_receipt(bills, &ReceiptModal::default())
    }

    pub fn render_list_with_receipt(&self, bills: &BillList, modal: &ReceiptModal) -> Result<String> {
        let template = BillsTemplate {
            nav: VerticalLayout::new(&self.user, &Route::Bills),
            bills: bills.bills().iter().map(|b| self.row(b)).collect(),
            modal: modal.view(),
        };
        Ok(template.render()?)
    }

    pub fn render_error(&self, error: &ErrorState) -> Result<String> {
        Ok(ErrorTemplate {
            error: error.to_string(),
        }
        .render()?)
    }

    pub fn on_click_new_bill(&self) -> NavigationIntent {
        NavigationIntent {
            route: Route::NewBill,
        }
    }

    pub fn on_click_view_receipt(&self, bill: &Bill) -> ModalIntent {
        ModalIntent {
            bill_id: bill.id.clone(),
            receipt_url: bill.receipt_url.clone(),
        }
    }

    fn row(&self, bill: &Bill) -> BillForList {
        BillForList {
            id: bill.id.to_string(),
            kind: bill.kind.clone(),
            name: bill.name.clone(),
            date: self.date_style.format(&bill.date),
            amount: format!("{} €", bill.amount),
            status: bill.status.label().to_string(),
            receipt_url: bill
                .receipt_url
                .as_ref()
                .map(|u| u.to_string())
                .unwrap_or_default(),
            receipt_path: Route::Receipt(bill.id.clone()).path(),
        }
    }
}
