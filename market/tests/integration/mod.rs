mod auction_3_party;
mod auction_nparty;
mod edge_cases;
mod error_cases;
mod registry;
mod tcp_loopback;
