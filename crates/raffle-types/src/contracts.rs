//! Solidity interfaces the raffle client calls.
//!
//! Only the functions and events the client actually uses are declared; the
//! contracts themselves live elsewhere.

use alloy_sol_types::sol;

sol! {
	/// Fungible token allowance surface.
	interface IERC20 {
		event Approval(address indexed owner, address indexed spender, uint256 value);

		function allowance(address owner, address spender) external view returns (uint256 remaining);
		function approve(address spender, uint256 amount) external returns (bool success);
	}

	/// Single-token approval surface of an NFT collection.
	interface IERC721 {
		function getApproved(uint256 tokenId) external view returns (address operator);
		function approve(address to, uint256 tokenId) external;
	}

	/// Operator approval surface of a multi-token collection.
	interface IERC1155 {
		function isApprovedForAll(address account, address operator) external view returns (bool approved);
		function setApprovalForAll(address operator, bool approved) external;
	}

	/// Parameter struct accepted by `RaffleDeployer.createRaffle`.
	///
	/// Field order is part of the ABI.
	struct RaffleParams {
		string name;
		uint256 startTime;
		uint256 duration;
		uint256 ticketLimit;
		uint256 winnersCount;
		uint256 maxTicketsPerParticipant;
		bool isPrized;
		uint256 customTicketPrice;
		bool erc721Drop;
		address prizeCollection;
		uint8 standard;
		uint256 prizeTokenId;
		uint256 amountPerWinner;
		string collectionName;
		string collectionSymbol;
		string collectionBaseURI;
		address creator;
		uint256 royaltyPercentage;
		address royaltyRecipient;
		uint256 maxSupply;
		address erc20PrizeToken;
		uint256 erc20PrizeAmount;
		uint256 ethPrizeAmount;
	}

	interface IRaffleDeployer {
		function createRaffle(RaffleParams params) external returns (address raffle);
	}

	interface IRaffleManager {
		function getAllRaffles() external view returns (address[] raffles);
		function toggleAllowExistingCollection() external view returns (bool allowed);
	}

	/// Read-only getters of a deployed raffle.
	interface IRaffle {
		function name() external view returns (string value);
		function creator() external view returns (address value);
		function startTime() external view returns (uint256 value);
		function duration() external view returns (uint256 value);
		function ticketPrice() external view returns (uint256 value);
		function ticketLimit() external view returns (uint256 value);
		function winnersCount() external view returns (uint256 value);
		function maxTicketsPerParticipant() external view returns (uint256 value);
		function isPrized() external view returns (bool value);
		function prizeCollection() external view returns (address value);
		function state() external view returns (uint8 value);
		function participants(uint256 index) external view returns (address participant);
	}
}
