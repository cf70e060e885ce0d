// Pagamento simulado: nenhuma chamada ao provedor é feita.
// Toda requisição autenticada é aprovada e ajusta o plano do usuário.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::database::UserRepository;
use crate::models::PaymentUser;
use crate::utils::AppError;

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(default)]
pub struct PaymentRequest {
    /// Plan price; recorded in the log only
    pub amount: Option<f64>,
    /// Trip credits bought with the plan
    pub trips: Option<i32>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct PaymentResponse {
    pub success: bool,
    pub message: String,
    pub user: PaymentUser,
}

pub async fn process_payment(
    users: &dyn UserRepository,
    user_id: &ObjectId,
    request: &PaymentRequest,
) -> Result<PaymentResponse, AppError> {
    let trips = request.trips.unwrap_or(0);

    log::info!(
        "💳 Mock payment for user {}: amount={:?}, trips={}",
        user_id,
        request.amount,
        trips
    );

    let user = users
        .apply_payment(user_id, trips)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(PaymentResponse {
        success: true,
        message: "Payment processed successfully".to_string(),
        user: user.into(),
    })
}
