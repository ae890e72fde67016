//! Macros for defining kind enums.

use derive_more::{Display, Error};

/// Macro for defining a kind enum.
///
/// Variants are represented as their `SCREAMING_SNAKE_CASE` names both in
/// text and in a database, and are parsed case-insensitively.
///
/// # Example
///
/// ```rust
/// # use common::define_kind;
///
/// define_kind! {
///     #[doc = "Shape kind."]
///     enum Kind {
///         #[doc = "A cube"]
///         Cube,
///
///         #[doc = "A sphere"]
///         Sphere,
///     }
/// }
///
/// assert_eq!("cube".parse::<Kind>().unwrap(), Kind::Cube);
/// assert_eq!(Kind::Sphere.as_str(), "SPHERE");
/// ```
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_kind {
    (
        #[doc = $doc:literal]
        enum $name:ident {
            $(
                #[doc = $variant_doc:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        #[derive(
            Clone,
            Copy,
            Debug,
            $crate::private::strum::Display,
            $crate::private::strum::IntoStaticStr,
            Eq,
            Hash,
            Ord,
            PartialEq,
            PartialOrd,
        )]
        #[cfg_attr(
            feature = "serde",
            derive(
                $crate::private::serde::Deserialize,
                $crate::private::serde::Serialize,
            ),
            serde(rename_all = "SCREAMING_SNAKE_CASE"),
        )]
        #[doc = $doc]
        #[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $(
                 #[doc = $variant_doc]
                 $variant,
            )*
        }

        impl $name {
            /// All the variants, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            /// Returns the textual representation of this kind.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                self.into()
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::UnknownKind;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|k| k.as_str().eq_ignore_ascii_case(s))
                    .ok_or_else(|| $crate::UnknownKind {
                        kind: ::core::stringify!($name),
                        value: s.to_owned(),
                    })
            }
        }

        #[cfg(feature = "postgres")]
        impl<'a> $crate::private::postgres_types::FromSql<'a> for $name {
            $crate::private::postgres_types::accepts!(VARCHAR, TEXT);

            fn from_sql(
                ty: &$crate::private::postgres_types::Type,
                raw: &'a [u8],
            ) -> Result<
                $name,
                Box<dyn ::std::error::Error
                    + ::core::marker::Sync
                    + ::core::marker::Send>,
            > {
                <&str as $crate::private::postgres_types::FromSql>::from_sql(
                    ty, raw,
                )?
                .parse()
                .map_err(::std::convert::Into::into)
            }
        }

        #[cfg(feature = "postgres")]
        impl $crate::private::postgres_types::ToSql for $name {
            $crate::private::postgres_types::accepts!(VARCHAR, TEXT);
            $crate::private::postgres_types::to_sql_checked!();

            fn to_sql(
                &self,
                ty: &$crate::private::postgres_types::Type,
                w: &mut $crate::private::postgres_types::private::BytesMut,
            ) -> Result<
                $crate::private::postgres_types::IsNull,
                ::std::boxed::Box<
                    dyn ::std::error::Error
                        + ::core::marker::Sync
                        + ::core::marker::Send
                >,
            > {
                <&str as $crate::private::postgres_types::ToSql>::to_sql(
                    &self.as_str(),
                    ty,
                    w,
                )
            }
        }
    };
}

/// Error of parsing a kind enum from an unknown value.
#[derive(Clone, Debug, Display, Error)]
#[display("unknown `{kind}` value: `{value}`")]
pub struct UnknownKind {
    /// Name of the kind enum.
    pub kind: &'static str,

    /// Value failed to be parsed.
    pub value: String,
}

#[cfg(test)]
mod spec {
    define_kind! {
        #[doc = "Test kind."]
        enum Shape {
            #[doc = "A cube."]
            Cube,

            #[doc = "A sphere."]
            Sphere,

            #[doc = "A flat circle."]
            FlatCircle,
        }
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("cube".parse::<Shape>().unwrap(), Shape::Cube);
        assert_eq!("SPHERE".parse::<Shape>().unwrap(), Shape::Sphere);
        assert_eq!("Flat_Circle".parse::<Shape>().unwrap(), Shape::FlatCircle);
    }

    #[test]
    fn rejects_unknown() {
        let err = "cone".parse::<Shape>().unwrap_err();
        assert_eq!(err.kind, "Shape");
        assert_eq!(err.to_string(), "unknown `Shape` value: `cone`");

        assert!("".parse::<Shape>().is_err());
        assert!(" cube".parse::<Shape>().is_err());
    }

    #[test]
    fn displays_screaming_snake_case() {
        assert_eq!(Shape::FlatCircle.to_string(), "FLAT_CIRCLE");
        assert_eq!(Shape::Cube.as_str(), "CUBE");
        assert_eq!(Shape::ALL, &[Shape::Cube, Shape::Sphere, Shape::FlatCircle]);
    }
}
