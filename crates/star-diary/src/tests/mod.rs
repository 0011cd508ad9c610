mod config;
mod local_auth;
mod local_objects;
