// Tank service - Use case for listing tanks
use crate::application::reading_repository::ReadingRepository;
use crate::domain::tank::Tank;
use std::sync::Arc;

#[derive(Clone)]
pub struct TankService {
    repository: Arc<dyn ReadingRepository>,
}

impl TankService {
    pub fn new(repository: Arc<dyn ReadingRepository>) -> Self {
        Self { repository }
    }

    pub async fn list_tanks(&self) -> anyhow::Result<Vec<Tank>> {
        let ids = self.repository.list_tank_ids().await?;
        Ok(ids.into_iter().map(Tank::new).collect())
    }
}
