/// Static provider fixtures
/// The catalog is a fixed in-memory list; nothing is created or destroyed
/// within a session.

use lazy_static::lazy_static;

use crate::catalog::Category;
use crate::model::{Availability, Provider};

lazy_static! {
    static ref PROVIDERS: Vec<Provider> = vec![
        Provider {
            id: "p1".to_string(),
            name: "Samuel Mwangi".to_string(),
            avatar: "https://picsum.photos/seed/p1/200/200".to_string(),
            category: Category::Plumbing,
            rating: 4.9,
            review_count: 127,
            price_per_hour: 1500,
            bio: "Licensed plumber with 8 years fixing burst pipes, blocked drains \
                  and full bathroom installations across Nairobi."
                .to_string(),
            skills: vec![
                "Pipe Repair".to_string(),
                "Drain Cleaning".to_string(),
                "Water Heaters".to_string(),
            ],
            is_verified: true,
            distance_km: 1.2,
            availability: Availability::Online,
        },
        Provider {
            id: "p2".to_string(),
            name: "David Ochieng".to_string(),
            avatar: "https://picsum.photos/seed/p2/200/200".to_string(),
            category: Category::Electrical,
            rating: 4.8,
            review_count: 94,
            price_per_hour: 1800,
            bio: "Certified electrician for wiring, socket repairs, lighting and \
                  backup power installations."
                .to_string(),
            skills: vec![
                "Wiring".to_string(),
                "Socket Repair".to_string(),
                "Solar Backup".to_string(),
            ],
            is_verified: true,
            distance_km: 2.4,
            availability: Availability::Online,
        },
        Provider {
            id: "p3".to_string(),
            name: "Grace Njeri".to_string(),
            avatar: "https://picsum.photos/seed/p3/200/200".to_string(),
            category: Category::Cleaning,
            rating: 4.7,
            review_count: 211,
            price_per_hour: 900,
            bio: "Deep-clean specialist for homes and offices. Supplies included."
                .to_string(),
            skills: vec![
                "Deep Cleaning".to_string(),
                "Sofa & Carpet".to_string(),
            ],
            is_verified: true,
            distance_km: 0.8,
            availability: Availability::Online,
        },
        Provider {
            id: "p4".to_string(),
            name: "Peter Kamau".to_string(),
            avatar: "https://picsum.photos/seed/p4/200/200".to_string(),
            category: Category::Carpentry,
            rating: 4.6,
            review_count: 58,
            price_per_hour: 1300,
            bio: "Custom furniture, door fittings and cabinet repairs."
                .to_string(),
            skills: vec![
                "Furniture".to_string(),
                "Door Fitting".to_string(),
            ],
            is_verified: false,
            distance_km: 3.1,
            availability: Availability::Offline,
        },
        Provider {
            id: "p5".to_string(),
            name: "Brian Otieno".to_string(),
            avatar: "https://picsum.photos/seed/p5/200/200".to_string(),
            category: Category::Mechanic,
            rating: 4.5,
            review_count: 76,
            price_per_hour: 2000,
            bio: "Mobile mechanic. Diagnostics, brakes, suspension and minor \
                  repairs at your parking spot."
                .to_string(),
            skills: vec![
                "Diagnostics".to_string(),
                "Brakes".to_string(),
            ],
            is_verified: true,
            distance_km: 4.5,
            availability: Availability::Online,
        },
        Provider {
            id: "p6".to_string(),
            name: "Faith Wanjiku".to_string(),
            avatar: "https://picsum.photos/seed/p6/200/200".to_string(),
            category: Category::Painting,
            rating: 4.8,
            review_count: 41,
            price_per_hour: 1100,
            bio: "Interior and exterior painting with colour consultation."
                .to_string(),
            skills: vec![
                "Interior".to_string(),
                "Exterior".to_string(),
            ],
            is_verified: false,
            distance_km: 2.0,
            availability: Availability::Online,
        },
        Provider {
            id: "p7".to_string(),
            name: "James Mutua".to_string(),
            avatar: "https://picsum.photos/seed/p7/200/200".to_string(),
            category: Category::AcRepair,
            rating: 4.7,
            review_count: 63,
            price_per_hour: 1700,
            bio: "AC servicing, gas refills and cold-room maintenance."
                .to_string(),
            skills: vec![
                "Servicing".to_string(),
                "Gas Refill".to_string(),
            ],
            is_verified: true,
            distance_km: 5.2,
            availability: Availability::Offline,
        },
        Provider {
            id: "p8".to_string(),
            name: "Mary Akinyi".to_string(),
            avatar: "https://picsum.photos/seed/p8/200/200".to_string(),
            category: Category::Saloon,
            rating: 4.9,
            review_count: 188,
            price_per_hour: 800,
            bio: "Home-visit braiding, styling and barber services."
                .to_string(),
            skills: vec![
                "Braiding".to_string(),
                "Styling".to_string(),
            ],
            is_verified: true,
            distance_km: 1.6,
            availability: Availability::Online,
        },
    ];
}

pub fn providers() -> &'static [Provider] {
    &PROVIDERS
}

pub fn find_provider(id: &str) -> Option<&'static Provider> {
    PROVIDERS.iter().find(|p| p.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_list_covers_every_category() {
        for category in Category::ALL {
            assert!(
                providers().iter().any(|p| p.category == category),
                "no fixture provider for {}",
                category
            );
        }
    }

    #[test]
    fn fixture_ids_are_unique() {
        let mut ids: Vec<_> = providers().iter().map(|p| p.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), providers().len());
    }

    #[test]
    fn lookup_by_id() {
        assert_eq!(find_provider("p1").map(|p| p.name.as_str()), Some("Samuel Mwangi"));
        assert!(find_provider("p99").is_none());
    }
}
