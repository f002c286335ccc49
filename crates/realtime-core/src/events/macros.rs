/// Declarative macro generating [`ServerEventType`], `ALL_SERVER_EVENT_TYPES`
/// and the wire-string helpers from a single list of `Variant => "wire"` pairs.
///
/// The generated enum always carries an extra `Unknown` variant: discriminants
/// outside the catalogue decode to it instead of failing.
///
/// [`ServerEventType`]: super::ServerEventType
macro_rules! define_server_events {
    (
        $(
            $(#[doc = $doc:literal])*
            $variant:ident => $wire:literal
        ),* $(,)?
    ) => {
        /// Discriminator for every server event in the realtime protocol.
        ///
        /// Each variant maps to the exact dot-separated wire string. Anything
        /// else is [`ServerEventType::Unknown`].
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum ServerEventType {
            $(
                $(#[doc = $doc])*
                $variant,
            )*
            /// A discriminant outside the catalogue.
            Unknown,
        }

        /// All catalogued server event types in definition order
        /// (`Unknown` excluded).
        pub const ALL_SERVER_EVENT_TYPES: [ServerEventType; { [$($wire,)*].len() }] = [
            $(ServerEventType::$variant,)*
        ];

        impl ServerEventType {
            /// Canonical wire string (e.g. `"response.text.delta"`).
            ///
            /// `Unknown` maps to `"unknown"`; use the raw string on the event
            /// itself when the original discriminant matters.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)*
                    Self::Unknown => "unknown",
                }
            }

            /// Look up a wire string in the catalogue.
            #[must_use]
            pub fn from_wire(wire: &str) -> Self {
                match wire {
                    $($wire => Self::$variant,)*
                    _ => Self::Unknown,
                }
            }
        }
    };
}

pub(crate) use define_server_events;
