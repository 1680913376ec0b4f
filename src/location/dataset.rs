//! Built-in location dataset: the states, cities and regions the storefront
//! offers in its location selects.

use super::types::{CityNode, LocationTree, StateNode};

struct BuiltinState {
    name: &'static str,
    abbreviation: &'static str,
    cities: &'static [(&'static str, &'static [&'static str])],
}

const BUILTIN_STATES: &[BuiltinState] = &[
    BuiltinState {
        name: "São Paulo",
        abbreviation: "SP",
        cities: &[
            ("São Paulo", &["Zona Norte", "Zona Sul", "Zona Leste", "Zona Oeste", "Centro"]),
            ("Campinas", &["Centro", "Barão Geraldo", "Cambui", "Taquaral"]),
            ("Santos", &["Centro", "Gonzaga", "Ponta da Praia", "Boqueirão"]),
        ],
    },
    BuiltinState {
        name: "Rio de Janeiro",
        abbreviation: "RJ",
        cities: &[
            ("Rio de Janeiro", &["Zona Norte", "Zona Sul", "Zona Oeste", "Centro"]),
            ("Niterói", &["Centro", "Icaraí", "São Francisco", "Ingá"]),
            ("Petrópolis", &["Centro", "Itaipava", "Cascatinha", "Quitandinha"]),
        ],
    },
    BuiltinState {
        name: "Minas Gerais",
        abbreviation: "MG",
        cities: &[
            ("Belo Horizonte", &["Centro-Sul", "Pampulha", "Barreiro", "Venda Nova"]),
            ("Uberlândia", &["Centro", "Santa Mônica", "Umuarama", "Jardim Karaíba"]),
            ("Juiz de Fora", &["Centro", "São Mateus", "Benfica", "Cascatinha"]),
        ],
    },
];

/// Build the owned tree from the static table.
pub fn builtin_tree() -> LocationTree {
    LocationTree {
        states: BUILTIN_STATES
            .iter()
            .map(|s| StateNode {
                name: s.name.to_string(),
                abbreviation: s.abbreviation.to_string(),
                cities: s
                    .cities
                    .iter()
                    .map(|(name, regions)| CityNode {
                        name: name.to_string(),
                        regions: regions.iter().map(|r| r.to_string()).collect(),
                    })
                    .collect(),
            })
            .collect(),
    }
}

/// Display name for a state code ("SP" → "São Paulo"), or the code itself.
pub fn state_display_name(code: &str) -> &str {
    BUILTIN_STATES
        .iter()
        .find(|s| s.abbreviation == code)
        .map(|s| s.name)
        .unwrap_or(code)
}
