use actix_web::{web, HttpResponse};

use super::{caller_id, failure};
use crate::middleware::auth::Claims;
use crate::services::payment_service::{self, PaymentRequest, PaymentResponse};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/payments/process",
    tag = "Payments",
    request_body = PaymentRequest,
    responses(
        (status = 200, description = "Mock payment accepted", body = PaymentResponse),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn process_payment(
    user: web::ReqData<Claims>,
    state: web::Data<AppState>,
    request: web::Json<PaymentRequest>,
) -> HttpResponse {
    log::info!("💳 POST /payments/process - user {}", user.sub);

    let result = async {
        let user_id = caller_id(&user)?;
        payment_service::process_payment(state.users.as_ref(), &user_id, &request).await
    }
    .await;

    match result {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => failure("Payment processing failed", e),
    }
}
