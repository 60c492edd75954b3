use tracing::debug;
use url::Url;

use crate::{
    db::bill::BillId,
    web::bill::{data::ReceiptModalView, presenter::ModalIntent},
};

/// Something that can show the receipt preview of a bill
pub trait ModalDisplay {
    fn show(&mut self, intent: &ModalIntent);
    fn hide(&mut self);
}

#[derive(Debug, Clone, Default)]
pub struct ReceiptModal {
    shown: bool,
    bill_id: Option<BillId>,
    receipt_url: Option<Url>,
}

impl ReceiptModal {
    pub fn is_shown(&self) -> bool {
        self.shown
    }

    pub fn bill_id(&self) -> Option<&BillId> {
        self.bill_id.as_ref()
    }

    pub fn view(&self) -> ReceiptModalView {
        ReceiptModalView {
            shown: self.shown,
            title: "Justificatif".to_string(),
            receipt_url: self
                .receipt_url
                .as_ref()
                .map(|u| u.to_string())
                .unwrap_or_default(),
        }
    }
}

impl ModalDisplay for ReceiptModal {
    fn show(&mut self, intent: &ModalIntent) {
        debug!("showing receipt of bill {}", intent.bill_id);
        self.shown = true;
        self.bill_id = Some(intent.bill_id.clone());
        self.receipt_url = intent.receipt_url.clone();
    }

    fn hide(&mut self) {
        self.shown = false;
        self.bill_id = None;
        self.receipt_url = None;
    }
}
