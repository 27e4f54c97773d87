//! Static reservoir catalog.
//!
//! The set of reservoirs served by the integration is fixed. Each entry
//! carries the descriptive fields that are copied into every response item,
//! plus the [`Reservoir::has_pressure`] flag that decides whether the derived
//! upper-bief pressure is reported.

use std::collections::BTreeMap;

/// Localized label for every field of a response item, keyed by field name.
pub type Description = BTreeMap<&'static str, &'static str>;

/// Conversion factor from upper-bief level (m) to pressure (kPa).
pub const PRESSURE_FACTOR: f64 = 0.101;

/// Field labels shared by every reservoir.
const BASE_DESCRIPTION: [(&str, &str); 9] = [
    ("id", "id"),
    ("send_datetime", "Маълумот юборилган сана ва вақт"),
    ("object_name", "Сув омбори объекти номи"),
    ("object_tin", "Сув омбори объекти СТИРи"),
    ("object_chief", "Сув омбори объекти раҳбари ФИШ"),
    ("chief_pinfl", "Сув омбори объекти раҳбари ПИНФЛи"),
    ("upper_bef_level", "Юқори бьеф сув сатҳи  (метр)"),
    ("down_bef_level", "Пастки бьеф сув сатҳи  (метр)"),
    ("upper_bef_volume", "Юқори бьеф сув ҳажми (млн.м3)"),
];

/// Label added for pressure-bearing reservoirs.
const PRESSURE_DESCRIPTION: (&str, &str) = ("upper_bef_pressure", "Юқори бьеф сув босими (КПа)");

/// A known reservoir and its static metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Reservoir {
    /// Numeric identifier used in the request path and in storage.
    pub id: i64,
    /// Title of the data feed.
    pub title: &'static str,
    /// Name of the reservoir facility.
    pub object_name: &'static str,
    /// Taxpayer identification number of the operating organization.
    pub object_tin: &'static str,
    /// Full name of the facility chief.
    pub object_chief: &'static str,
    /// Personal identification number of the facility chief.
    pub chief_pinfl: &'static str,
    /// Downstream (lower bief) water level in meters. Not measured.
    pub down_bef_level: f64,
    /// Whether items for this reservoir carry `upper_bef_pressure`.
    pub has_pressure: bool,
}

impl Reservoir {
    /// Build the field description map for this reservoir.
    ///
    /// A new map is returned on every call, so callers may modify it freely.
    pub fn description(&self) -> Description {
        let mut description: Description = BASE_DESCRIPTION.into_iter().collect();
        if self.has_pressure {
            description.insert(PRESSURE_DESCRIPTION.0, PRESSURE_DESCRIPTION.1);
        }
        description
    }

    /// Derived upper-bief pressure for a given level, if this reservoir reports it.
    pub fn pressure_for(&self, level: f64) -> Option<f64> {
        self.has_pressure.then(|| level * PRESSURE_FACTOR)
    }
}

static RESERVOIRS: [Reservoir; 3] = [
    Reservoir {
        id: 1,
        title: "Андижон сув омборида жойлашган назорат-ўлчаш қурилмаларининг автоматлаштирилган-ташхис назорат тизими орқали келувчи маълумотларни олиш",
        object_name: "Андижон сув омбори",
        object_tin: "304952767",
        object_chief: "Мирзаев Фуркат Солохидинович",
        chief_pinfl: "32203821450019",
        down_bef_level: 822.0,
        has_pressure: false,
    },
    Reservoir {
        id: 2,
        title: "Оҳангарон сув омборида жойлашган назорат-ўлчаш қурилмаларининг автоматлаштирилган-ташхис назорат тизими орқали келувчи маълумотларни олиш",
        object_name: "Оҳангарон сув омбори",
        object_tin: "304952767",
        object_chief: "Турдиев Ботир Бакирович",
        chief_pinfl: "31108620620016",
        down_bef_level: 1010.0,
        has_pressure: true,
    },
    Reservoir {
        id: 4,
        title: "Ҳисорак сув омборида жойлашган назорат-ўлчаш қурилмаларининг автоматлаштирилган-ташхис назорат тизими орқали келувчи маълумотларни олиш",
        object_name: "Ҳисорак сув омбори",
        object_tin: "304952767",
        object_chief: "Зиядуллаев Салохиддин Файзуллаевич",
        chief_pinfl: "33101682730055",
        down_bef_level: 1060.0,
        has_pressure: true,
    },
];

/// Look up a reservoir by id.
///
/// Returns `None` for any id outside the fixed catalog.
pub fn lookup(reservoir_id: i64) -> Option<&'static Reservoir> {
    RESERVOIRS.iter().find(|r| r.id == reservoir_id)
}

/// All reservoirs in the catalog, ordered by id.
pub fn all() -> &'static [Reservoir] {
    &RESERVOIRS
}
