use axum::{
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    Ctx,
    db::bill::BillId,
    web::{
        Result,
        navigator::{Pages, Route},
        session::UserContext,
    },
};

fn pages(ctx: &Ctx, user: UserContext) -> Pages {
    Pages::new(ctx.bill_store.clone(), user, ctx.config.date_style)
}

#[tracing::instrument(level = tracing::Level::DEBUG, skip(ctx))]
pub async fn list(State(ctx): State<Ctx>, user: UserContext) -> Result<impl IntoResponse> {
    pages(&ctx, user).render(&Route::Bills).await
}

#[tracing::instrument(level = tracing::Level::DEBUG, skip(ctx))]
pub async fn new_bill(State(ctx): State<Ctx>, user: UserContext) -> Result<impl IntoResponse> {
    pages(&ctx, user).render(&Route::NewBill).await
}

#[tracing::instrument(level = tracing::Level::DEBUG, skip(ctx))]
pub async fn receipt(
    State(ctx): State<Ctx>,
    user: UserContext,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    pages(&ctx, user)
        .render(&Route::Receipt(BillId(id)))
        .await
}
