//! gRPC façade over the token engine.
//!
//! Check and Delete answer token problems with `success: false`; the other
//! procedures answer them with a single generic `Unauthenticated` status.
//! Store failures always surface as `Unavailable`.

use crate::error::SessionError;
use crate::jwt::{AccountInfo, AccountType};
use crate::metrics;
use crate::proto;
use crate::proto::session_service_server::SessionService;
use crate::session::{IdentityQuery, LivenessPolicy, TokenEngine};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tonic::{Request, Response, Status};
use tracing::debug;

pub struct SessionServiceImpl {
    engine: Arc<TokenEngine>,
    identity: IdentityQuery,
}

impl SessionServiceImpl {
    pub fn new(engine: Arc<TokenEngine>) -> Self {
        let identity = IdentityQuery::new(Arc::clone(&engine), LivenessPolicy::RequireLiveSession);
        SessionServiceImpl { engine, identity }
    }
}

impl From<AccountType> for proto::AccountType {
    fn from(account_type: AccountType) -> Self {
        match account_type {
            AccountType::Standard => proto::AccountType::Standard,
            AccountType::Premium => proto::AccountType::Premium,
            AccountType::Admin => proto::AccountType::Admin,
        }
    }
}

impl TryFrom<&proto::AccountInfo> for AccountInfo {
    type Error = SessionError;

    fn try_from(info: &proto::AccountInfo) -> Result<Self, Self::Error> {
        let account_type = match proto::AccountType::try_from(info.r#type) {
            Ok(proto::AccountType::Standard) => AccountType::Standard,
            Ok(proto::AccountType::Premium) => AccountType::Premium,
            Ok(proto::AccountType::Admin) => AccountType::Admin,
            Ok(proto::AccountType::Unspecified) | Err(_) => {
                return Err(SessionError::InvalidArgument(format!(
                    "unknown account type {}",
                    info.r#type
                )))
            }
        };
        Ok(AccountInfo::new(info.id, account_type))
    }
}

async fn timed<T>(method: &'static str, fut: impl Future<Output = T>) -> T {
    let started = Instant::now();
    let out = fut.await;
    metrics::record_grpc_latency(method, started.elapsed().as_secs_f64());
    out
}

fn reject(method: &'static str, err: SessionError) -> Status {
    if !err.is_infrastructure() {
        debug!(method, error_kind = err.kind(), "Request rejected");
    }
    Status::from(err)
}

fn token_status(
    method: &'static str,
    result: Result<(), SessionError>,
) -> Result<Response<proto::TokenStatus>, Status> {
    match result {
        Ok(()) => Ok(Response::new(proto::TokenStatus { success: true })),
        Err(err) if err.is_token_problem() => {
            debug!(method, error_kind = err.kind(), "Token not accepted");
            Ok(Response::new(proto::TokenStatus { success: false }))
        }
        Err(err) => Err(reject(method, err)),
    }
}

#[tonic::async_trait]
impl SessionService for SessionServiceImpl {
    async fn create_token(
        &self,
        request: Request<proto::AccountInfo>,
    ) -> Result<Response<proto::TokenString>, Status> {
        timed("CreateToken", async {
            let account = AccountInfo::try_from(request.get_ref())
                .map_err(|e| reject("CreateToken", e))?;

            let token = self
                .engine
                .issue(account)
                .await
                .map_err(|e| reject("CreateToken", e))?;

            Ok::<_, Status>(Response::new(proto::TokenString { token }))
        })
        .await
    }

    async fn refresh_token(
        &self,
        request: Request<proto::TokenString>,
    ) -> Result<Response<proto::TokenString>, Status> {
        timed("RefreshToken", async {
            let token = self
                .engine
                .refresh(&request.get_ref().token)
                .await
                .map_err(|e| reject("RefreshToken", e))?;

            Ok::<_, Status>(Response::new(proto::TokenString { token }))
        })
        .await
    }

    async fn delete_token(
        &self,
        request: Request<proto::TokenString>,
    ) -> Result<Response<proto::TokenStatus>, Status> {
        timed("DeleteToken", async {
            let result = self.engine.revoke(&request.get_ref().token).await;
            token_status("DeleteToken", result)
        })
        .await
    }

    async fn check_token(
        &self,
        request: Request<proto::TokenString>,
    ) -> Result<Response<proto::TokenStatus>, Status> {
        timed("CheckToken", async {
            let result = self.engine.check(&request.get_ref().token).await;
            token_status("CheckToken", result)
        })
        .await
    }

    async fn get_account_id_from_token(
        &self,
        request: Request<proto::TokenString>,
    ) -> Result<Response<proto::AccountId>, Status> {
        timed("GetAccountIdFromToken", async {
            let id = self
                .identity
                .account_id(&request.get_ref().token)
                .await
                .map_err(|e| reject("GetAccountIdFromToken", e))?;

            Ok::<_, Status>(Response::new(proto::AccountId { id }))
        })
        .await
    }

    async fn get_account_type_from_token(
        &self,
        request: Request<proto::TokenString>,
    ) -> Result<Response<proto::AccountTypeReply>, Status> {
        timed("GetAccountTypeFromToken", async {
            let account_type = self
                .identity
                .account_type(&request.get_ref().token)
                .await
                .map_err(|e| reject("GetAccountTypeFromToken", e))?;

            Ok::<_, Status>(Response::new(proto::AccountTypeReply {
                r#type: proto::AccountType::from(account_type).into(),
            }))
        })
        .await
    }
}
