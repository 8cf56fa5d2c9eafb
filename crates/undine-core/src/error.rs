pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("link {source_name} -> {target_name}: endpoint `{endpoint}` is not a known device or subnet")]
    UnresolvedEndpoint {
        source_name: String,
        target_name: String,
        endpoint: String,
    },

    #[error("device `{name}`: group index {index} is out of range")]
    GroupIndexOutOfRange { name: String, index: i64 },

    #[error("group `{id}` references unknown parent `{parent}`")]
    UnknownGroupParent { id: String, parent: String },

    #[error("group parent chain starting at `{id}` forms a cycle")]
    GroupCycle { id: String },
}
