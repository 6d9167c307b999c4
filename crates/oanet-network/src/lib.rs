//! oanet network - citation and coauthorship edge lists from work records

pub mod attributes;
pub mod builder;
pub mod edge;
pub mod export;
pub mod ids;
pub mod weighted;

// Re-exports for convenience
pub use attributes::{
    AttributeFilter, AuthorVertex, DEFAULT_KEPT_ATTRIBUTES, author_vertices, vertex_attributes,
    work_vertices,
};
pub use builder::{
    CitationScope, NetworkOptions, Networks, author_ids, build_edges, build_networks,
    citation_edges, coauthorship_edges, reference_ids,
};
pub use edge::{Edge, EdgeKind};
pub use export::{
    nodes_path, save_citation_network, save_coauthorship_network, save_edges_csv,
    save_weighted_csv, write_authors_csv, write_edges_csv, write_vertices_csv, write_weighted_csv,
};
pub use ids::{int_to_openalex_id, openalex_id_to_int};
pub use weighted::{WeightedEdge, simplify_coauthorship};
