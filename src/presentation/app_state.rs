// Application state for HTTP handlers
use crate::application::chart_service::ChartService;
use crate::application::streaming_service::StreamingDashboardService;
use crate::application::tank_service::TankService;

#[derive(Clone)]
pub struct AppState {
    pub tank_service: TankService,
    pub chart_service: ChartService,
    pub streaming_service: StreamingDashboardService,
}
