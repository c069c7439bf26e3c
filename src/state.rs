use std::sync::Arc;

use crate::auth::{TokenError, TokenIssuer};
use crate::config::AppConfig;
use crate::database::DocumentStore;
use crate::services::{AuthService, CctvService, ContactService, UserService};

/// Everything a handler needs, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DocumentStore>,
    pub auth: AuthService,
    pub users: UserService,
    pub contacts: ContactService,
    pub cctvs: CctvService,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn DocumentStore>) -> Result<Self, TokenError> {
        let tokens = TokenIssuer::new(&config.security)?;
        let filter = config.filter.clone();

        let users = UserService::new(Arc::clone(&store), filter.clone());
        let contacts = ContactService::new(Arc::clone(&store), filter.clone());
        let cctvs = CctvService::new(Arc::clone(&store), contacts.clone(), filter);
        let auth = AuthService::new(users.clone(), tokens, config.security.verify_session);

        Ok(Self {
            config: Arc::new(config),
            store,
            auth,
            users,
            contacts,
            cctvs,
        })
    }
}
