use sea_orm::DatabaseConnection;

use crate::{
    db::dao::DaoContext,
    services::{
        auth_service::AuthService, invoice_service::InvoiceService, user_service::UserService,
    },
    state::AppState,
};

#[derive(Clone)]
pub struct ServiceContext {
    daos: DaoContext,
}

impl ServiceContext {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self {
            daos: DaoContext::new(db),
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(&state.db)
    }

    pub fn user(&self) -> UserService {
        UserService::new(self.daos.user())
    }

    pub fn invoice(&self) -> InvoiceService {
        InvoiceService::new(self.daos.success_invoice(), self.daos.failed_invoice())
    }

    pub fn auth(&self, state: &AppState) -> AuthService {
        AuthService::new(
            self.user(),
            state.jwt.clone(),
            state.access_token_ttl_secs(),
        )
    }
}
