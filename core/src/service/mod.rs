pub mod dose_service;
