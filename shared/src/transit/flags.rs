use std::ops::BitOr;

macro_rules! flag_set {
    ($(#[$meta:meta])* $name:ident { $($(#[$flag_meta:meta])* $flag:ident = $bit:expr,)* }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
        pub struct $name(u32);

        impl $name {
            pub const NONE: $name = $name(0);
            $($(#[$flag_meta])* pub const $flag: $name = $name($bit);)*

            pub const fn from_bits(bits: u32) -> Self {
                Self(bits)
            }

            pub const fn bits(&self) -> u32 {
                self.0
            }

            pub const fn contains(&self, other: $name) -> bool {
                self.0 & other.0 == other.0
            }
        }

        impl BitOr for $name {
            type Output = $name;

            fn bitor(self, rhs: $name) -> $name {
                $name(self.0 | rhs.0)
            }
        }
    };
}

flag_set!(
    /// Flags a viewer sends along with a teleport request
    TeleportFlags {
        SET_HOME_TO_TARGET = 1 << 0,
        SET_LAST_TO_TARGET = 1 << 1,
        VIA_LURE = 1 << 2,
        VIA_LANDMARK = 1 << 3,
        VIA_LOCATION = 1 << 4,
        VIA_HOME = 1 << 5,
        VIA_TELEHUB = 1 << 6,
        VIA_LOGIN = 1 << 7,
        VIA_GODLIKE_LURE = 1 << 8,
        GODLIKE = 1 << 9,
        IS_FLYING = 1 << 13,
    }
);

flag_set!(
    /// How an attached object should be serialized before it leaves the region
    SerializationFlags {
        FROM_CROSSING = 1 << 0,
        /// Stops running scripts; a failed transit has to restart them
        STOP_SCRIPTS = 1 << 1,
        SERIALIZE_SCRIPT_BYTECODE = 1 << 2,
    }
);

flag_set!(
    /// Tells the destination region how the agent is arriving
    LocomotionFlags {
        TELEPORT = 1 << 0,
        CROSSING = 1 << 1,
    }
);
