pub mod activities_api_service;
pub mod notice_service;
pub mod roster_sync_service;
