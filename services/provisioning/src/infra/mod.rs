pub mod gotrue;
pub mod http;
pub mod postgrest;

use crate::config::BackendConfig;
use crate::usecase::resolve::PagedIdentityResolver;

use self::gotrue::{GoTrueAdminClient, GoTrueSessionClient};
use self::http::BackendClient;
use self::postgrest::{
    RestBatchRepository, RestCourseRepository, RestEnrollmentRepository, RestProfileRepository,
};

/// Every adapter for one backend project, sharing a connection pool.
#[derive(Clone)]
pub struct Backend {
    pub client: BackendClient,
}

impl Backend {
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            client: BackendClient::new(config),
        }
    }

    pub fn directory(&self) -> GoTrueAdminClient {
        GoTrueAdminClient {
            client: self.client.clone(),
        }
    }

    pub fn resolver(&self) -> PagedIdentityResolver<GoTrueAdminClient> {
        PagedIdentityResolver::new(self.directory())
    }

    pub fn sessions(&self) -> GoTrueSessionClient {
        GoTrueSessionClient {
            client: self.client.clone(),
        }
    }

    pub fn profiles(&self) -> RestProfileRepository {
        RestProfileRepository {
            client: self.client.clone(),
        }
    }

    pub fn courses(&self) -> RestCourseRepository {
        RestCourseRepository {
            client: self.client.clone(),
        }
    }

    pub fn batches(&self) -> RestBatchRepository {
        RestBatchRepository {
            client: self.client.clone(),
        }
    }

    pub fn enrollments(&self) -> RestEnrollmentRepository {
        RestEnrollmentRepository {
            client: self.client.clone(),
        }
    }
}
