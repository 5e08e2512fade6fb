use sqlx::{Postgres, Transaction};

use crate::common::error::AppError;
use crate::config::AppState;
use crate::middleware::auth::AgentContext;

// ---
// Helper RLS: A "Chave" para o Banco de Dados
// ---
/// Abre uma transação e define `app.agent_id` para as políticas RLS.
///
/// O `set_config(..., true)` vale só até o fim da transação, então a chave nunca
/// vaza para a próxima requisição que pegar essa conexão da pool.
pub(crate) async fn begin_rls_transaction(
    app_state: &AppState,
    agent: &AgentContext,
) -> Result<Transaction<'static, Postgres>, AppError> {
    let mut tx = app_state.db_pool.begin().await?;

    sqlx::query("SELECT set_config('app.agent_id', $1, true)")
        .bind(agent.0.to_string())
        .execute(&mut *tx)
        .await?;

    Ok(tx)
}
