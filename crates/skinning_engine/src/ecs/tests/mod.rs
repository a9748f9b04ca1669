//! ECS integration tests

mod skinning_integration;
