//! Event catalogues and the decoder matching raw logs against them.
use alloy::sol_types::SolEvent;
use alloy_primitives::B256;
use tracing::trace;
use vdn_messages::thor::RawLog;

alloy::sol! {
    #![sol(all_derives)]

    /// Emitted by the registry when a node is pointed at a resolver.
    event NewResolver(bytes32 indexed node, address resolver);

    event AddrChanged(bytes32 indexed node, address a);
    event NameChanged(bytes32 indexed node, string name);
    event TextChanged(bytes32 indexed node, string indexed indexed_key, string key, string value);
    event ContenthashChanged(bytes32 indexed node, bytes hash);
    event DNSRecordChanged(bytes32 indexed node, bytes name, uint16 resource, bytes record);
    event DNSRecordDeleted(bytes32 indexed node, bytes name, uint16 resource);
    event DNSZonehashChanged(bytes32 indexed node, bytes lastzonehash, bytes zonehash);
}

/// Outcome of matching a raw log against a catalogue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decoded<E> {
    Matched(E),
    /// The log is not part of the catalogue, or its payload does not fit
    /// the matched signature. Callers skip it.
    Unmatched,
}

impl<E> Decoded<E> {
    pub fn matched(self) -> Option<E> {
        match self {
            Decoded::Matched(event) => Some(event),
            Decoded::Unmatched => None,
        }
    }
}

/// A closed set of event signatures decoded into one enum.
pub trait EventCatalogue: Sized {
    /// Topic identifiers (first topic) of every entry, in catalogue order.
    fn topics() -> Vec<B256>;

    /// Match `log` by its first topic and decode it.
    fn decode(log: &RawLog) -> Decoded<Self>;

    /// Name of the matched entry.
    fn name(&self) -> &'static str;
}

/// Declares a catalogue enum with one variant per `sol!` event.
macro_rules! event_catalogue {
    (
        $(#[$meta:meta])*
        $vis:vis enum $catalogue:ident { $($event:ident),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq)]
        $vis enum $catalogue {
            $($event($event),)+
        }

        impl EventCatalogue for $catalogue {
            fn topics() -> Vec<B256> {
                vec![$(<$event as SolEvent>::SIGNATURE_HASH,)+]
            }

            fn decode(log: &RawLog) -> Decoded<Self> {
                let Some(topic0) = log.topics.first() else {
                    return Decoded::Unmatched;
                };

                $(
                    if *topic0 == <$event as SolEvent>::SIGNATURE_HASH {
                        return match <$event as SolEvent>::decode_raw_log(
                            log.topics.iter().copied(),
                            &log.data,
                            true,
                        ) {
                            Ok(event) => Decoded::Matched(Self::$event(event)),
                            Err(err) => {
                                trace!(
                                    "Malformed {} log. block: {} err: {}",
                                    stringify!($event),
                                    log.block_number(),
                                    err,
                                );
                                Decoded::Unmatched
                            },
                        };
                    }
                )+

                Decoded::Unmatched
            }

            fn name(&self) -> &'static str {
                match self {
                    $(Self::$event(_) => stringify!($event),)+
                }
            }
        }
    };
}

event_catalogue! {
    /// Events replayed from the registry contract.
    pub enum RegistryEvent {
        NewResolver,
    }
}

event_catalogue! {
    /// Events replayed from every resolver contract.
    pub enum ResolverEvent {
        NameChanged,
        AddrChanged,
        TextChanged,
        ContenthashChanged,
        DNSRecordChanged,
        DNSRecordDeleted,
        DNSZonehashChanged,
    }
}
