pub mod shared {
    pub mod core {
        pub mod primitives;
        pub mod upsert;
    }
    pub mod infrastructure {
        pub mod debounce;
        pub mod key_value_store;
    }
}

pub mod modules {
    pub mod time_tracking {
        pub mod core {
            pub mod colors;
            pub mod filter;
            pub mod normalize;
            pub mod ports;
            pub mod settings;
            pub mod snap;
            pub mod ticket;
            pub mod time_block;
            pub mod totals;
        }
        pub mod application {
            pub mod calendar_adapter;
            pub mod controller;
            pub mod error_banner;
            pub mod errors;
            pub mod event_store;
            pub mod persistence;
            pub mod ticket_list;
        }
        pub mod adapters {
            pub mod inbound {
                pub mod csv_import;
                pub mod http;
            }
            pub mod outbound {
                pub mod csv_export;
                pub mod in_memory_calendar;
                pub mod recording_prompt;
            }
        }
    }
}

pub mod shell;

#[cfg(test)]
pub mod tests {
    pub mod fixtures {
        pub mod tickets;
        pub mod time_blocks;
    }
}
