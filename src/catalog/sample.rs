//! Built-in sample dataset, used offline and when no backend is reachable.

use chrono::{DateTime, Utc};

use super::types::{Dealer, Proposal, ProposalStatus, Transmission, Vehicle, VehicleLocation};

struct SampleVehicle {
    id: &'static str,
    make: &'static str,
    model: &'static str,
    year: u16,
    price: u64,
    images: &'static [&'static str],
    transmission: Transmission,
    location: (&'static str, &'static str, &'static str),
    color: &'static str,
    mileage: u32,
    is_sold: bool,
    created_at: &'static str,
    dealer_id: &'static str,
}

const SAMPLE_VEHICLES: &[SampleVehicle] = &[
    SampleVehicle {
        id: "1", make: "Toyota", model: "Corolla", year: 2021, price: 105900,
        images: &["/images/toyota-corolla.jpg", "/images/toyota-corolla-2.jpg"],
        transmission: Transmission::Automatic,
        location: ("SP", "São Paulo", "Zona Sul"),
        color: "Prata", mileage: 35000, is_sold: false,
        created_at: "2023-03-15T10:30:00Z", dealer_id: "1",
    },
    SampleVehicle {
        id: "2", make: "Honda", model: "Civic", year: 2022, price: 129900,
        images: &["/images/honda-civic.jpg", "/images/honda-civic-2.jpg"],
        transmission: Transmission::Automatic,
        location: ("RJ", "Rio de Janeiro", "Zona Norte"),
        color: "Preto", mileage: 15000, is_sold: false,
        created_at: "2023-05-20T14:15:00Z", dealer_id: "2",
    },
    SampleVehicle {
        id: "3", make: "Volkswagen", model: "Golf", year: 2020, price: 89900,
        images: &["/images/vw-golf.jpg"],
        transmission: Transmission::Manual,
        location: ("SP", "Campinas", "Centro"),
        color: "Branco", mileage: 45000, is_sold: true,
        created_at: "2023-02-10T09:45:00Z", dealer_id: "1",
    },
    SampleVehicle {
        id: "4", make: "Hyundai", model: "HB20", year: 2021, price: 72900,
        images: &["/images/hyundai-hb20.jpg"],
        transmission: Transmission::Manual,
        location: ("MG", "Belo Horizonte", "Centro-Sul"),
        color: "Vermelho", mileage: 28000, is_sold: false,
        created_at: "2023-04-05T11:20:00Z", dealer_id: "3",
    },
    SampleVehicle {
        id: "5", make: "Chevrolet", model: "Onix", year: 2022, price: 79900,
        images: &["/images/chevrolet-onix.jpg"],
        transmission: Transmission::Automatic,
        location: ("SP", "São Paulo", "Zona Oeste"),
        color: "Azul", mileage: 12000, is_sold: false,
        created_at: "2023-06-12T16:30:00Z", dealer_id: "2",
    },
    SampleVehicle {
        id: "6", make: "Fiat", model: "Argo", year: 2021, price: 68500,
        images: &["/images/fiat-argo.jpg"],
        transmission: Transmission::Manual,
        location: ("RJ", "Rio de Janeiro", "Zona Sul"),
        color: "Prata", mileage: 32000, is_sold: false,
        created_at: "2023-01-25T13:10:00Z", dealer_id: "3",
    },
];

fn timestamp(s: &str) -> DateTime<Utc> {
    s.parse().unwrap_or_default()
}

/// The six reference listings.
pub fn vehicles() -> Vec<Vehicle> {
    SAMPLE_VEHICLES
        .iter()
        .map(|s| Vehicle {
            id: s.id.to_string(),
            make: s.make.to_string(),
            model: s.model.to_string(),
            year: s.year,
            price: s.price,
            images: s.images.iter().map(|i| i.to_string()).collect(),
            main_image: s.images.first().map(|i| i.to_string()).unwrap_or_default(),
            transmission: s.transmission,
            location: VehicleLocation {
                state: s.location.0.to_string(),
                city: s.location.1.to_string(),
                region: s.location.2.to_string(),
            },
            color: s.color.to_string(),
            mileage: s.mileage,
            fuel_type: "Flex".to_string(),
            is_sold: s.is_sold,
            created_at: timestamp(s.created_at),
            dealer_id: s.dealer_id.to_string(),
        })
        .collect()
}

pub fn dealers() -> Vec<Dealer> {
    [
        ("1", "João Silva", "joao@autoproposta.com", "(11) 98765-4321", "São Paulo", "SP", "2022-06-10T08:30:00Z"),
        ("2", "Maria Oliveira", "maria@autoproposta.com", "(21) 98765-1234", "Rio de Janeiro", "RJ", "2022-07-15T10:15:00Z"),
        ("3", "Carlos Santos", "carlos@autoproposta.com", "(31) 99876-5432", "Belo Horizonte", "MG", "2022-08-20T14:45:00Z"),
    ]
    .into_iter()
    .map(|(id, name, email, phone, city, state, created)| Dealer {
        id: id.into(),
        name: name.into(),
        email: email.into(),
        phone: phone.into(),
        city: city.into(),
        state: state.into(),
        created_at: timestamp(created),
    })
    .collect()
}

pub fn proposals() -> Vec<Proposal> {
    [
        ("1", "1", "Pedro Almeida", "pedro@email.com", "(11) 97654-3210",
         "Tenho interesse neste veículo e gostaria de agendar um test drive.",
         ProposalStatus::Pending, "2023-07-05T09:30:00Z"),
        ("2", "2", "Ana Costa", "ana@email.com", "(21) 98765-4321",
         "Qual a condição para financiamento deste veículo?",
         ProposalStatus::Contacted, "2023-07-10T14:20:00Z"),
        ("3", "4", "Lucas Ferreira", "lucas@email.com", "(31) 99876-5432",
         "Estou interessado neste carro. Aceita troca como parte do pagamento?",
         ProposalStatus::Accepted, "2023-07-15T11:45:00Z"),
        ("4", "5", "Julia Martins", "julia@email.com", "(11) 98765-1234",
         "Gostaria de saber se o preço é negociável.",
         ProposalStatus::Rejected, "2023-07-20T16:10:00Z"),
    ]
    .into_iter()
    .map(|(id, vehicle_id, name, email, phone, message, status, created)| Proposal {
        id: id.into(),
        vehicle_id: vehicle_id.into(),
        customer_name: name.into(),
        customer_email: email.into(),
        customer_phone: phone.into(),
        message: message.into(),
        status,
        created_at: timestamp(created),
    })
    .collect()
}
