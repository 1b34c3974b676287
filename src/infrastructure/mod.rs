pub mod rest_gateway;
