use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::web::{
    bill::data::{BillForList, ReceiptModalView},
    navigator::Route,
    session::UserContext,
};

use super::error::Error;

pub struct HtmlTemplate<T>(pub T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(e) => {
                tracing::error!("Error rendering template: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error rendering template",
                )
                    .into_response()
            }
        }
    }
}

/// Left-hand navigation shared by the employee pages
#[derive(Debug, Clone)]
pub struct VerticalLayout {
    pub bills_active: bool,
    pub new_bill_active: bool,
    pub email: String,
}

impl VerticalLayout {
    pub fn new(user: &UserContext, route: &Route) -> Self {
        let employee = user.is_employee();
        Self {
            bills_active: employee && matches!(route, Route::Bills | Route::Receipt(_)),
            new_bill_active: employee && matches!(route, Route::NewBill),
            email: user.email.clone().unwrap_or_default(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub error: String,
}

#[derive(Template)]
#[template(path = "bills.html")]
pub struct BillsTemplate {
    pub nav: VerticalLayout,
    pub bills: Vec<BillForList>,
    pub modal: ReceiptModalView,
}

#[derive(Template)]
#[template(path = "new_bill.html")]
pub struct NewBillTemplate {
    pub nav: VerticalLayout,
    pub expense_types: Vec<&'static str>,
}

impl NewBillTemplate {
    pub fn new(user: &UserContext) -> Self {
        Self {
            nav: VerticalLayout::new(user, &Route::NewBill),
            expense_types: vec![
                "Transports",
                "Restaurants et bars",
                "Hôtel et logement",
                "Services en ligne",
                "IT et électronique",
                "Equipement et matériel",
                "Fournitures de bureau",
            ],
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let response = match self {
            Error::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                String::from("Internal Server Error"),
            ),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        (
            response.0,
            HtmlTemplate(ErrorTemplate { error: response.1 }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::bill::BillId, web::session::Role};

    #[test]
    fn bills_icon_is_active_for_employees_on_bills() {
        let employee = UserContext::employee("a@a");
        assert!(VerticalLayout::new(&employee, &Route::Bills).bills_active);
        assert!(
            VerticalLayout::new(&employee, &Route::Receipt(BillId("x".to_string()))).bills_active
        );

        let on_new_bill = VerticalLayout::new(&employee, &Route::NewBill);
        assert!(!on_new_bill.bills_active);
        assert!(on_new_bill.new_bill_active);

        let admin = UserContext {
            role: Role::Admin,
            email: None,
        };
        assert!(!VerticalLayout::new(&admin, &Route::Bills).bills_active);
    }

    #[test]
    fn error_template_contains_message() {
        let html = ErrorTemplate {
            error: "Erreur 404".to_string(),
        }
        .render()
        .unwrap();
        assert!(html.contains("Erreur 404"));
    }

    #[test]
    fn errors_map_to_status_pages() {
        let resp = Error::NotFound("no page at /nope".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            Error::Internal.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
