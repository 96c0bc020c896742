//! Hard-coded marketing copy shown on the public pages.

pub const COMPANY: &str = "Gauranshi Salons Pvt. Ltd.";
pub const SHORT_NAME: &str = "Gauranshi Salons";
pub const TAGLINE: &str = "Two Concepts. One Standard.";

pub struct ContactDetails {
    pub address: &'static [&'static str],
    pub phone: &'static str,
    pub email: &'static str,
    pub hours: &'static str,
}

pub const CONTACT: ContactDetails = ContactDetails {
    address: &["Sector - 6, Dwarka", "New Delhi - 110078"],
    phone: "+91 XXXXX XXXXX",
    email: "info@irasalon.com",
    hours: "Mon - Sun: 10:00 AM - 8:00 PM",
};

pub struct NavLink {
    pub name: &'static str,
    pub path: &'static str,
}

pub const NAV_LINKS: [NavLink; 7] = [
    NavLink { name: "Home", path: "/" },
    NavLink { name: "About Us", path: "/about" },
    NavLink { name: "Our Brands", path: "/brands" },
    NavLink { name: "Services", path: "/services" },
    NavLink { name: "Plans", path: "/plans" },
    NavLink { name: "Become Associate", path: "/become-associate" },
    NavLink { name: "Contact Us", path: "/contact" },
];

pub struct Brand {
    pub name: &'static str,
    pub size: &'static str,
    pub badge: &'static str,
    pub summary: &'static str,
    pub description: &'static str,
    pub features: [&'static str; 4],
}

pub const BRANDS: [Brand; 2] = [
    Brand {
        name: "IRA Studio",
        size: "200 sq. ft.",
        badge: "Compact",
        summary: "Quick & efficient unisex salon services in a compact 200 sq. ft. space",
        description: "IRA Studio is our compact, efficient salon format designed for the modern, \
            busy individual. In just 200 sq. ft., we deliver quick yet quality unisex salon \
            services without compromising on excellence.",
        features: [
            "Quick & efficient services",
            "Ideal for express grooming",
            "Space-optimized design",
            "All essential services available",
        ],
    },
    Brand {
        name: "IRA La Salon",
        size: "2000 sq. ft.",
        badge: "Premium",
        summary: "Luxury salon experience in an expansive 2000 sq. ft. premium space",
        description: "IRA La Salon is our flagship premium salon format. Spread across 2000 sq. \
            ft., it offers a luxurious salon experience with comprehensive beauty and grooming \
            services in an elegant, spacious environment.",
        features: [
            "Full luxury salon experience",
            "Comprehensive service menu",
            "Spacious & elegant interiors",
            "Bridal & special occasion packages",
        ],
    },
];

pub struct SalonService {
    pub title: &'static str,
    pub description: &'static str,
    pub features: [&'static str; 4],
}

pub const SERVICES: [SalonService; 6] = [
    SalonService {
        title: "Hair Cutting & Styling",
        description: "Expert haircuts and styling for all hair types. From classic cuts to \
            trendy styles, our skilled stylists create the perfect look for you.",
        features: ["Precision Cuts", "Layered Styling", "Blow Dry", "Hair Spa"],
    },
    SalonService {
        title: "Hair Coloring",
        description: "Transform your look with our professional hair coloring services. From \
            subtle highlights to bold transformations.",
        features: ["Global Color", "Highlights", "Balayage", "Color Correction"],
    },
    SalonService {
        title: "Facial & Skin Care",
        description: "Rejuvenate your skin with our premium facial treatments. Experience the \
            glow with our customized skincare solutions.",
        features: ["Deep Cleansing", "Anti-Aging", "Brightening", "Hydration"],
    },
    SalonService {
        title: "Beard & Grooming",
        description: "Complete grooming services for the modern gentleman. Expert beard styling \
            and maintenance for a polished look.",
        features: ["Beard Trim", "Shaping", "Hot Towel Shave", "Beard Spa"],
    },
    SalonService {
        title: "Bridal Packages",
        description: "Make your special day unforgettable with our comprehensive bridal beauty \
            packages. Complete makeover for the bride.",
        features: ["Bridal Makeup", "Hair Styling", "Mehendi", "Pre-Bridal Care"],
    },
    SalonService {
        title: "Groom Packages",
        description: "Look your best on your wedding day with our specialized groom packages. \
            Complete grooming solutions for the groom.",
        features: ["Grooming", "Facial", "Hair Styling", "Manicure & Pedicure"],
    },
];

pub struct Card {
    pub title: &'static str,
    pub text: &'static str,
}

pub const ABOUT: &str = "Gauranshi Salons Pvt. Ltd. is a modern unisex salon company offering high \
    quality grooming and beauty services through two exclusive formats: IRA Studio for quick and \
    compact services, and IRA La Salon for luxury and premium salon experience.";

pub const VISION: Card = Card {
    title: "Redefining Beauty Standards",
    text: "To become the most trusted name in the Indian salon industry by delivering exceptional \
        grooming experiences that make every customer feel confident and beautiful.",
};

pub const MISSION: Card = Card {
    title: "Excellence in Every Service",
    text: "To provide world-class beauty and grooming services through our innovative salon \
        formats, making premium salon experiences accessible to everyone.",
};

pub const VALUES: [Card; 4] = [
    Card { title: "Quality", text: "Premium products and expert techniques for every service" },
    Card { title: "Customer First", text: "Your satisfaction is our top priority" },
    Card { title: "Excellence", text: "Continuously raising the bar in salon standards" },
    Card { title: "Passion", text: "Love for beauty drives everything we do" },
];

pub const BENEFITS: [Card; 4] = [
    Card {
        title: "Digital Marketing",
        text: "Get professional digital marketing campaigns for your salon",
    },
    Card {
        title: "Lead Generation",
        text: "Receive potential customer leads directly to grow your business",
    },
    Card {
        title: "Dashboard Access",
        text: "Track your membership, benefits, and marketing templates",
    },
    Card {
        title: "Network Support",
        text: "Join a growing network of salon professionals across India",
    },
];

pub const STEPS: [Card; 4] = [
    Card { title: "Register", text: "Create your account with email & password" },
    Card { title: "Fill Profile", text: "Add your salon details and services" },
    Card { title: "Choose Plan", text: "Select a membership plan that suits you" },
    Card { title: "Start Growing", text: "Access marketing tools and start receiving leads" },
];

pub struct Template {
    pub title: &'static str,
    pub category: &'static str,
    pub description: &'static str,
}

/// Marketing templates unlocked by any active subscription.
pub const TEMPLATES: [Template; 10] = [
    Template { title: "Grand Opening Post", category: "Social Media", description: "Announce your salon opening in style" },
    Template { title: "Special Offer Banner", category: "Promotion", description: "Promote special discounts & offers" },
    Template { title: "Bridal Package Post", category: "Social Media", description: "Highlight bridal services" },
    Template { title: "Before & After Post", category: "Showcase", description: "Showcase stunning transformations" },
    Template { title: "Festival Greetings", category: "Seasonal", description: "Seasonal & festival greetings" },
    Template { title: "Customer Testimonial", category: "Social Proof", description: "Share glowing customer reviews" },
    Template { title: "New Service Launch", category: "Announcement", description: "Introduce exciting new services" },
    Template { title: "Team Spotlight", category: "Behind Scenes", description: "Feature your talented stylists" },
    Template { title: "Hair Care Tips", category: "Educational", description: "Share expert beauty advice" },
    Template { title: "Weekend Special", category: "Promotion", description: "Weekend offer promotions" },
];
