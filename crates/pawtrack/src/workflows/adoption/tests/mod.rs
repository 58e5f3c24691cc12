mod common;
mod policy;
mod routing;
