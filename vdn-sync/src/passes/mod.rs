//! The two sync passes. Resolver assignments run first: record mutations
//! only reach the node projection once the node's resolver is known.
mod records;
mod resolvers;

pub use records::ResolverRecordPass;
pub use resolvers::ResolverAssignmentPass;
