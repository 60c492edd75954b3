#[derive(Debug, Clone)]
pub struct BillForList {
    pub id: String,
    pub kind: String,
    pub name: String,
    pub date: String,
    pub amount: String,
    pub status: String,
    pub receipt_url: String,
    pub receipt_path: String,
}

#[derive(Debug, Clone, Default)]
pub struct ReceiptModalView {
    pub shown: bool,
    pub title: String,
    /// empty if the bill has no receipt
    pub receipt_url: String,
}
