//! Fixed demo content used by the seeder.

use worldhire_core::Role;

pub struct DemoAccount {
    pub email: &'static str,
    pub password: &'static str,
    pub full_name: &'static str,
    pub phone: &'static str,
    pub role: Role,
}

/// Accounts created by the account step, in signup order.
pub const DEMO_ACCOUNTS: &[DemoAccount] = &[
    DemoAccount {
        email: "admin@demo.com",
        password: "Demo123!",
        full_name: "Amina Rahman",
        phone: "+971500000001",
        role: Role::Admin,
    },
    DemoAccount {
        email: "employer@demo.com",
        password: "Demo123!",
        full_name: "Gulf Build Contracting",
        phone: "+971500000002",
        role: Role::Employer,
    },
    DemoAccount {
        email: "employer2@demo.com",
        password: "Demo123!",
        full_name: "Harbour Care Group",
        phone: "+6560000003",
        role: Role::Employer,
    },
    DemoAccount {
        email: "worker@demo.com",
        password: "Demo123!",
        full_name: "Jose Santos",
        phone: "+639170000004",
        role: Role::Worker,
    },
    DemoAccount {
        email: "worker2@demo.com",
        password: "Demo123!",
        full_name: "Priya Nair",
        phone: "+919800000005",
        role: Role::Worker,
    },
    DemoAccount {
        email: "worker3@demo.com",
        password: "Demo123!",
        full_name: "Tuan Nguyen",
        phone: "+84900000006",
        role: Role::Worker,
    },
];

/// Its presence means the account step already ran.
pub const SENTINEL_EMAIL: &str = "admin@demo.com";

/// The worker whose profile, skills and history get filled in.
pub const PRIMARY_WORKER_EMAIL: &str = "worker@demo.com";

pub const DEMO_WORKER_EMAILS: &[&str] = &["worker@demo.com", "worker2@demo.com", "worker3@demo.com"];

pub struct JobCategory {
    pub name: &'static str,
    pub titles: &'static [&'static str],
    pub skills: &'static [&'static str],
    /// Monthly USD salary floor.
    pub base_salary: u32,
}

pub const CATEGORIES: &[JobCategory] = &[
    JobCategory {
        name: "Construction",
        titles: &["Steel Fixer", "Site Welder", "Scaffolder", "Mason"],
        skills: &["Welding", "Blueprint Reading", "Scaffolding", "Safety Compliance", "Concrete Work"],
        base_salary: 1200,
    },
    JobCategory {
        name: "Healthcare",
        titles: &["Staff Nurse", "Caregiver", "Nursing Assistant", "Physiotherapy Aide"],
        skills: &["Patient Care", "First Aid", "Elderly Care", "Medication Administration", "Vital Signs"],
        base_salary: 1800,
    },
    JobCategory {
        name: "Hospitality",
        titles: &["Line Cook", "Housekeeping Attendant", "Front Desk Agent", "Barista"],
        skills: &["Food Safety", "Customer Service", "Housekeeping", "Cash Handling", "Menu Preparation"],
        base_salary: 1000,
    },
    JobCategory {
        name: "Manufacturing",
        titles: &["Machine Operator", "Quality Inspector", "Assembly Technician", "Forklift Operator"],
        skills: &["CNC Operation", "Quality Control", "Lean Manufacturing", "Forklift License", "Assembly"],
        base_salary: 1100,
    },
    JobCategory {
        name: "Agriculture",
        titles: &["Farm Hand", "Greenhouse Worker", "Harvest Supervisor", "Livestock Handler"],
        skills: &["Crop Harvesting", "Irrigation", "Tractor Operation", "Animal Husbandry", "Pest Control"],
        base_salary: 900,
    },
    JobCategory {
        name: "Logistics",
        titles: &["Warehouse Associate", "Heavy Truck Driver", "Inventory Clerk", "Dispatcher"],
        skills: &["Inventory Management", "Heavy Vehicle License", "Route Planning", "Pallet Jack", "Shipping Documentation"],
        base_salary: 1150,
    },
];

/// `(city, country)` pairs every category is posted to.
pub const PRIORITY_LOCATIONS: &[(&str, &str)] = &[
    ("Dubai", "UAE"),
    ("Doha", "Qatar"),
    ("Riyadh", "Saudi Arabia"),
    ("Kuwait City", "Kuwait"),
    ("Singapore", "Singapore"),
    ("Kuala Lumpur", "Malaysia"),
    ("Tokyo", "Japan"),
    ("Seoul", "South Korea"),
    ("Berlin", "Germany"),
];

/// Locations used to fill the quota beyond the priority grid.
pub const SECONDARY_LOCATIONS: &[(&str, &str)] = &[
    ("Warsaw", "Poland"),
    ("Toronto", "Canada"),
    ("Sydney", "Australia"),
    ("Muscat", "Oman"),
    ("Manama", "Bahrain"),
];

pub const APPLICATION_STATUSES: &[&str] = &[
    "pending",
    "reviewing",
    "shortlisted",
    "interview_scheduled",
    "offered",
    "rejected",
];

pub const COVER_LETTERS: &[&str] = &[
    "I have several years of hands-on experience in this field and can relocate immediately.",
    "My previous employer abroad can provide references. I am eager to join your team.",
    "I hold the required certifications and have worked in similar roles in the Gulf region.",
];

pub fn category(name: &str) -> Option<&'static JobCategory> {
    CATEGORIES.iter().find(|category| category.name == name)
}
