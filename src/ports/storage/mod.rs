mod object_store;

pub use object_store::{ScopedClient, StoreClient, StoreConnector};
